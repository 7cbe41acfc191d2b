use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};

// Check if the database exists, if not, create it, then open a pool
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        tracing::info!(database_url, "creating database");
        Sqlite::create_database(database_url).await?;
    }

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

// Create the 'users' and 'todos' tables if they don't exist
pub async fn create_tables(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    // Duplicate signups race on the UNIQUE constraint, not on application
    // checks.
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL
    );"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        completed BOOLEAN NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL,
        owner_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
