use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Satu baris notifikasi per penerima. Dibuat massal (satu per admin) saat
/// dosen mengajukan ketpub; pembacaannya ada di sisi lain aplikasi.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}
