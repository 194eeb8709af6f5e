use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_ORDER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a001_order (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        order_id TEXT NOT NULL,
        account TEXT NOT NULL,
        order_date INTEGER NOT NULL,
        customer_name TEXT NOT NULL DEFAULT '',
        amount REAL NOT NULL DEFAULT 0,
        payment_type TEXT NOT NULL,
        status TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT '',
        rto INTEGER NOT NULL DEFAULT 0,
        replacement INTEGER NOT NULL DEFAULT 0,
        delivered_date INTEGER,
        synced_from_amazon INTEGER NOT NULL DEFAULT 0,
        synced_from_flipkart INTEGER NOT NULL DEFAULT 0,
        last_sync_date INTEGER NOT NULL,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 1
    );
"#;

const CREATE_ORDER_USER_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_a001_order_user_id ON a001_order (user_id);
"#;

/// Build a sqlite URL for a file path (Windows drive letters included)
fn sqlite_url(db_file: &str) -> anyhow::Result<String> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

/// Create the schema if missing
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for sql in [CREATE_ORDER_TABLE, CREATE_ORDER_USER_INDEX] {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    let db_url = sqlite_url(db_file)?;
    tracing::info!("Connecting to database: {}", db_url);

    let conn = Database::connect(&db_url).await?;
    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    tracing::info!("Database initialized");
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
