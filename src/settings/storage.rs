use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::admins;

use super::types::{AdminFields, AdminProfile, Upsert};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admins)]
pub struct DbAdmin {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn db_admin_to_profile(db: DbAdmin) -> AdminProfile {
    AdminProfile {
        id: db.id,
        first_name: db.first_name,
        last_name: db.last_name,
        email: db.email,
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

/// The single admin row, oldest first if more than one ever slipped in.
pub fn get_admin(conn: &mut PgConnection) -> QueryResult<Option<AdminProfile>> {
    Ok(admins::table
        .order(admins::created_at.asc())
        .select(DbAdmin::as_select())
        .first(conn)
        .optional()?
        .map(db_admin_to_profile))
}

pub fn upsert_admin(
    conn: &mut PgConnection,
    fields: AdminFields,
) -> Result<(AdminProfile, Upsert), ApiError> {
    conn.transaction::<_, ApiError, _>(|conn| {
        let now = Utc::now();
        match get_admin(conn)? {
            Some(existing) => {
                let row: DbAdmin = diesel::update(admins::table.find(existing.id))
                    .set((
                        admins::first_name.eq(&fields.first_name),
                        admins::last_name.eq(&fields.last_name),
                        admins::email.eq(&fields.email),
                        admins::updated_at.eq(now),
                    ))
                    .returning(DbAdmin::as_returning())
                    .get_result(conn)?;
                Ok((db_admin_to_profile(row), Upsert::Updated))
            }
            None => {
                let row: DbAdmin = diesel::insert_into(admins::table)
                    .values(DbAdmin {
                        id: Uuid::new_v4(),
                        first_name: fields.first_name,
                        last_name: fields.last_name,
                        email: fields.email,
                        created_at: now,
                        updated_at: now,
                    })
                    .returning(DbAdmin::as_returning())
                    .get_result(conn)?;
                Ok((db_admin_to_profile(row), Upsert::Created))
            }
        }
    })
}
