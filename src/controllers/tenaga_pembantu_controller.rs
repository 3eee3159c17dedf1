use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Result};
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth;
use crate::models::tenaga_pembantu::{TenagaPembantu, TenagaPembantuForm, TenagaPembantuQuery};
use crate::models::user::Role;

const TENAGA_COLUMNS: &str =
    "id, pkm_id, penelitian_id, nama, status, created_at, updated_at";

fn require_admin(req: &HttpRequest) -> Result<()> {
    let claims = auth::verify_jwt(req)?;
    if Role::parse(&claims.role) != Some(Role::Admin) {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengakses API ini",
        ));
    }
    Ok(())
}

/// Tambah tenaga pembantu. Skema membiarkan kedua foreign key nullable;
/// aturan "tepat satu induk" dijaga di sini.
#[post("/api/tenaga-pembantu")]
pub async fn create_tenaga_pembantu(
    pool: web::Data<SqlitePool>,
    form: web::Json<TenagaPembantuForm>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    let nama = form.nama.as_deref().map(str::trim).unwrap_or("");
    if nama.is_empty() {
        return Err(actix_web::error::ErrorBadRequest(
            "Nama tenaga pembantu wajib diisi",
        ));
    }

    let (parent_table, parent_id) = match (form.pkm_id, form.penelitian_id) {
        (Some(id), None) => ("pkm", id),
        (None, Some(id)) => ("penelitian", id),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "Tepat satu induk (pkm_id atau penelitian_id) harus diisi",
            ));
        }
    };

    let parent = sqlx::query_as::<_, (i64,)>(&format!(
        "SELECT id FROM {parent_table} WHERE id = ?"
    ))
    .bind(parent_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("DB select {} error: {:?}", parent_table, e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data induk")
    })?;

    if parent.is_none() {
        return Err(actix_web::error::ErrorNotFound("Data induk tidak ditemukan"));
    }

    let res = sqlx::query(
        "INSERT INTO tenaga_pembantu (pkm_id, penelitian_id, nama, status) VALUES (?, ?, ?, ?)",
    )
    .bind(form.pkm_id)
    .bind(form.penelitian_id)
    .bind(nama)
    .bind(&form.status)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("DB insert tenaga_pembantu error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menyimpan data")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Data tenaga pembantu berhasil disimpan",
        "inserted_id": res.last_insert_rowid()
    })))
}

/// Daftar tenaga pembantu, bisa difilter per induk lewat query string.
#[get("/api/tenaga-pembantu")]
pub async fn get_tenaga_pembantu_list(
    pool: web::Data<SqlitePool>,
    query: web::Query<TenagaPembantuQuery>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    let list = match (query.pkm_id, query.penelitian_id) {
        (Some(pkm_id), _) => {
            sqlx::query_as::<_, TenagaPembantu>(&format!(
                "SELECT {TENAGA_COLUMNS} FROM tenaga_pembantu WHERE pkm_id = ? ORDER BY id"
            ))
            .bind(pkm_id)
            .fetch_all(pool.get_ref())
            .await
        }
        (None, Some(penelitian_id)) => {
            sqlx::query_as::<_, TenagaPembantu>(&format!(
                "SELECT {TENAGA_COLUMNS} FROM tenaga_pembantu WHERE penelitian_id = ? ORDER BY id"
            ))
            .bind(penelitian_id)
            .fetch_all(pool.get_ref())
            .await
        }
        (None, None) => {
            sqlx::query_as::<_, TenagaPembantu>(&format!(
                "SELECT {TENAGA_COLUMNS} FROM tenaga_pembantu ORDER BY id"
            ))
            .fetch_all(pool.get_ref())
            .await
        }
    }
    .map_err(|e| {
        log::error!("DB select tenaga_pembantu error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": list
    })))
}

#[delete("/api/tenaga-pembantu/{id}")]
pub async fn delete_tenaga_pembantu(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_admin(&req)?;
    let id = path.into_inner();

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM tenaga_pembantu WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("DB select tenaga_pembantu error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal mengambil data")
        })?;

    if existing.is_none() {
        return Err(actix_web::error::ErrorNotFound(
            "Data tenaga pembantu tidak ditemukan",
        ));
    }

    sqlx::query("DELETE FROM tenaga_pembantu WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("DB delete tenaga_pembantu error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menghapus data")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Data tenaga pembantu berhasil dihapus"
    })))
}
