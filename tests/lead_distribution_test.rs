#[cfg(test)]
mod lead_distribution_integration_tests {
    use crmserver::activities::storage::count_assignment_activities;
    use crmserver::core::config::DatabaseConfig;
    use crmserver::core::shared::schema::{activities, employees, leads};
    use crmserver::core::shared::utils::{create_conn, run_migrations, DbPool};
    use crmserver::employees::storage::{delete_employee, insert_employee};
    use crmserver::employees::NewEmployeeFields;
    use crmserver::leads::storage::{get_lead, insert_leads, lock_lead, unassigned_leads};
    use crmserver::leads::{ImportedLead, LeadStatus, LeadType, MatchTier};
    use crmserver::{distribute_unassigned, ApiError};
    use diesel::prelude::*;
    use std::sync::{Mutex, MutexGuard};

    // Tests here share tables and one of them commits rows.
    static DB_GUARD: Mutex<()> = Mutex::new(());

    fn exclusive() -> MutexGuard<'static, ()> {
        DB_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connect() -> Option<DbPool> {
        connect_with(1)
    }

    fn connect_with(max_connections: u32) -> Option<DbPool> {
        // Skip test if PostgreSQL is not configured
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("Skipping test - DATABASE_URL not set");
                return None;
            }
        };
        let pool = match create_conn(&DatabaseConfig {
            url,
            max_connections,
        }) {
            Ok(pool) => pool,
            Err(e) => {
                println!("Skipping test - Cannot connect to PostgreSQL: {e}");
                return None;
            }
        };
        if let Err(e) = run_migrations(&pool) {
            println!("Skipping test - migrations failed: {e}");
            return None;
        }
        Some(pool)
    }

    fn staff(first_name: &str, language: &str, location: &str) -> NewEmployeeFields {
        NewEmployeeFields {
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            email: format!("{}-{}@example.test", first_name.to_lowercase(), uuid::Uuid::new_v4()),
            location: location.to_string(),
            language: language.to_string(),
        }
    }

    fn row(name: &str, language: &str, location: &str) -> ImportedLead {
        ImportedLead {
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            date: String::new(),
            language: language.to_string(),
            location: location.to_string(),
            lead_type: LeadType::Warm,
        }
    }

    fn clear_tables(conn: &mut PgConnection) -> Result<(), ApiError> {
        diesel::delete(activities::table).execute(conn)?;
        diesel::delete(leads::table).execute(conn)?;
        diesel::delete(employees::table).execute(conn)?;
        Ok(())
    }

    #[test]
    fn test_distribution_against_postgres() {
        let _guard = exclusive();
        let Some(pool) = connect() else { return };
        let mut conn = pool.get().expect("pooled connection");

        conn.test_transaction::<_, ApiError, _>(|conn| {
            clear_tables(conn)?;
            let hindi = insert_employee(conn, staff("Asha", "Hindi", "Delhi"))?;
            let tamil = insert_employee(conn, staff("Ravi", "Tamil", "Chennai"))?;
            assert!(hindi.employee_id.starts_with("CON"));

            let inserted = insert_leads(
                conn,
                vec![
                    row("full", "hindi", "DELHI"),
                    row("partial", "Tamil", "Pune"),
                    row("first-equal", "French", "Paris"),
                    row("second-equal", "German", "Berlin"),
                ],
            )?;
            assert_eq!(inserted.len(), 4);
            assert_eq!(inserted[0].name, "full");
            assert!(inserted.iter().all(|l| l.status == LeadStatus::Unassigned));

            let report = distribute_unassigned(conn)?;
            assert!(report.error.is_none());
            assert_eq!(report.remaining, 0);
            let tiers: Vec<MatchTier> = report.assigned.iter().map(|a| a.tier).collect();
            assert_eq!(
                tiers,
                vec![
                    MatchTier::FullMatch,
                    MatchTier::PartialMatch,
                    MatchTier::EqualDistribution,
                    MatchTier::EqualDistribution,
                ]
            );
            let assignees: Vec<_> = report.assigned.iter().map(|a| a.employee_id).collect();
            // Hindi holds one and Tamil one before the equal split, so ties go
            // to roster order and then alternate.
            assert_eq!(assignees, vec![hindi.id, tamil.id, hindi.id, tamil.id]);

            for lead in &inserted {
                let stored = get_lead(conn, lead.id)?;
                assert_eq!(stored.status, LeadStatus::Assigned);
                assert!(stored.assigned_to.is_some());
                assert_eq!(count_assignment_activities(conn, lead.id)?, 1);
            }

            let rerun = distribute_unassigned(conn)?;
            assert!(rerun.assigned.is_empty());
            assert_eq!(rerun.considered, 0);

            let released = delete_employee(conn, tamil.id)?;
            assert_eq!(released, 2);
            assert_eq!(unassigned_leads(conn)?.len(), 2);

            let after_delete = distribute_unassigned(conn)?;
            assert!(after_delete
                .assigned
                .iter()
                .all(|a| a.employee_id == hindi.id));
            Ok(())
        });
    }

    #[test]
    fn test_no_employees_leaves_leads_waiting() {
        let _guard = exclusive();
        let Some(pool) = connect() else { return };
        let mut conn = pool.get().expect("pooled connection");

        conn.test_transaction::<_, ApiError, _>(|conn| {
            clear_tables(conn)?;
            insert_leads(conn, vec![row("orphan", "Hindi", "Delhi")])?;

            let report = distribute_unassigned(conn)?;
            assert!(report.assigned.is_empty());
            assert_eq!(report.remaining, 1);
            assert!(report.error.is_none());
            assert_eq!(unassigned_leads(conn)?.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn test_rejected_activity_rolls_back_the_assignment() {
        let _guard = exclusive();
        let Some(pool) = connect() else { return };
        let mut conn = pool.get().expect("pooled connection");

        conn.test_transaction::<_, ApiError, _>(|conn| {
            clear_tables(conn)?;
            let asha = insert_employee(conn, staff("Asha", "Hindi", "Delhi"))?;
            let inserted = insert_leads(conn, vec![row("blocked", "Hindi", "Delhi")])?;
            let lead_id = inserted[0].id;

            diesel::sql_query(
                "CREATE FUNCTION reject_activity() RETURNS trigger AS $$ \
                 BEGIN RAISE EXCEPTION 'activity log offline'; END; \
                 $$ LANGUAGE plpgsql",
            )
            .execute(conn)?;
            diesel::sql_query(
                "CREATE TRIGGER reject_activity BEFORE INSERT ON activities \
                 FOR EACH ROW EXECUTE FUNCTION reject_activity()",
            )
            .execute(conn)?;

            let report = distribute_unassigned(conn)?;
            assert!(report.assigned.is_empty());
            assert_eq!(report.remaining, 1);
            assert!(report.error.is_some());

            let stored = get_lead(conn, lead_id)?;
            assert_eq!(stored.status, LeadStatus::Unassigned);
            assert!(stored.assigned_to.is_none());
            assert_eq!(count_assignment_activities(conn, lead_id)?, 0);

            diesel::sql_query("DROP TRIGGER reject_activity ON activities").execute(conn)?;

            let retry = distribute_unassigned(conn)?;
            assert_eq!(retry.considered, 1);
            assert_eq!(retry.assigned.len(), 1);
            assert_eq!(retry.assigned[0].employee_id, asha.id);
            assert_eq!(count_assignment_activities(conn, lead_id)?, 1);
            Ok(())
        });
    }

    #[test]
    fn test_locked_lead_blocks_a_second_editor() {
        let _guard = exclusive();
        let Some(pool) = connect_with(2) else { return };
        let mut first = pool.get().expect("first connection");
        let mut second = pool.get().expect("second connection");

        let lead_id = insert_leads(&mut first, vec![row("contested", "Hindi", "Delhi")])
            .expect("insert lead")[0]
            .id;

        first
            .transaction::<_, ApiError, _>(|first| {
                let held = lock_lead(first, lead_id)?;
                assert_eq!(held.status, LeadStatus::Unassigned);

                let blocked = second.transaction::<_, ApiError, _>(|second| {
                    diesel::sql_query("SET LOCAL lock_timeout = '200ms'").execute(second)?;
                    lock_lead(second, lead_id)
                });
                assert!(matches!(blocked, Err(ApiError::Database(_))));
                Ok(())
            })
            .expect("first editor keeps the lock");

        let released = second
            .transaction::<_, ApiError, _>(|second| lock_lead(second, lead_id))
            .expect("lock is free after commit");
        assert_eq!(released.id, lead_id);

        diesel::delete(leads::table.find(lead_id))
            .execute(&mut first)
            .expect("cleanup");
    }
}
