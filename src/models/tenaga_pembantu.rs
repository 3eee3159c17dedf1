use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TenagaPembantu {
    pub id: i64,
    pub pkm_id: Option<i64>,
    pub penelitian_id: Option<i64>,
    pub nama: Option<String>,
    pub status: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct TenagaPembantuForm {
    pub pkm_id: Option<i64>,
    pub penelitian_id: Option<i64>,
    pub nama: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TenagaPembantuQuery {
    pub pkm_id: Option<i64>,
    pub penelitian_id: Option<i64>,
}
