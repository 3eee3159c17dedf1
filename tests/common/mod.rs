#![allow(dead_code)]

use actix_web::cookie::Cookie;
use chrono::Utc;
use sipub_backend::models::user::User;
use sipub_backend::{auth, db};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Pool SQLite in-memory dengan migrasi terpasang dan foreign key aktif.
pub async fn setup_pool() -> SqlitePool {
    std::env::set_var("JWT_SECRET", "rahasia-test");

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

pub async fn seed_user(pool: &SqlitePool, id: &str, role: &str) -> User {
    let name = format!("User {id}");
    let email = format!("{id}@kampus.ac.id");
    sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(&name)
        .bind(&email)
        .bind(role)
        .execute(pool)
        .await
        .unwrap();

    User {
        id: id.to_string(),
        name,
        email,
        role: role.to_string(),
        created_at: Utc::now().naive_utc(),
    }
}

pub fn login_cookie(user: &User) -> Cookie<'static> {
    Cookie::new("access_token", auth::generate_jwt(user).unwrap())
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_as::<_, (i64,)>(sql)
        .fetch_one(pool)
        .await
        .unwrap()
        .0
}
