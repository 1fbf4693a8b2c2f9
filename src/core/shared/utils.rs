use crate::core::config::DatabaseConfig;
use crate::core::shared::error::ApiError;
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run database migrations
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Number of embedded migrations not yet applied.
pub fn pending_migration_count(
    conn: &mut PgConnection,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    Ok(conn.pending_migrations(MIGRATIONS)?.len())
}

/// Runs diesel work on the blocking pool with a pooled connection.
pub async fn run_blocking<T, F>(pool: &DbPool, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await?
}

/// Today's date in the `YYYY-MM-DD` form used by attendance rows.
pub fn today_ymd() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Current wall-clock time as `HH:MM`.
pub fn now_hhmm() -> String {
    Utc::now().format("%H:%M").to_string()
}

/// Checks a calendar date written as `YYYY-MM-DD`.
pub fn parse_ymd(date: &str) -> Result<String, String> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|parsed| parsed.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date '{date}', expected YYYY-MM-DD"))
}

/// Accepts `H:MM` or `HH:MM` and returns the zero-padded form.
pub fn parse_hhmm(time: &str) -> Result<String, String> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|parsed| parsed.format("%H:%M").to_string())
        .map_err(|_| format!("Invalid time '{time}', expected HH:MM"))
}
