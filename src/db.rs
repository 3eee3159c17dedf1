use dotenv::dotenv;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::env;
use std::str::FromStr;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Membuka pool SQLite dan menjalankan migrasi. Foreign key diaktifkan di
/// setiap koneksi supaya cascade delete ketpub -> penulis berlaku.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            log::error!("Gagal membuat pool database: {:?}", e);
            e
        })?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

pub async fn establish_connection() -> Result<SqlitePool, sqlx::Error> {
    dotenv().ok();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sipub.db".to_string());

    connect(&database_url).await
}
