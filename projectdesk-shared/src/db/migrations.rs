/// Embedded schema migrations
///
/// SQL files under `projectdesk-shared/migrations/` are compiled into the
/// binary with `sqlx::migrate!` and applied at startup when
/// `DATABASE_RUN_MIGRATIONS` is enabled.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::db::migrations::{ensure_database_exists, run_migrations};
/// use sqlx::PgPool;
///
/// # async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
/// ensure_database_exists(url).await?;
/// let pool = PgPool::connect(url).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{info, warn};

/// Applies every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Applying database migrations");
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        e
    })?;
    info!("Database schema is current");
    Ok(())
}

/// Number of successfully applied migrations, `0` on a blank database.
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let tracked: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT FROM information_schema.tables
                        WHERE table_schema = 'public' AND table_name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    if !tracked {
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
}

/// Creates the database named in `database_url` if the server lacks it.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Creating database");
        Postgres::create_database(database_url).await?;
    }
    Ok(())
}
