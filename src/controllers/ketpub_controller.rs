use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::auth;
use crate::export;
use crate::models::ketpub::{validate_ketpub_form, Ketpub, KetpubForm, KetpubWithPenulis, Penulis};
use crate::models::user::Role;

const KETPUB_COLUMNS: &str = "id, user_id, judul, nama_penerbit, penerbit, volume, nomor, bulan, \
                              tahun, akreditas, issn, tanggal, status_surat, nomor_surat, \
                              created_at, updated_at";

async fn fetch_ketpub(pool: &SqlitePool, id: i64) -> Result<Ketpub> {
    let ketpub = sqlx::query_as::<_, Ketpub>(&format!(
        "SELECT {KETPUB_COLUMNS} FROM ketpub WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        log::error!("DB select ketpub error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data")
    })?;

    ketpub.ok_or_else(|| actix_web::error::ErrorNotFound("Data ketpub tidak ditemukan"))
}

async fn fetch_penulis(pool: &SqlitePool, ketpub_id: i64) -> Result<Vec<Penulis>> {
    sqlx::query_as::<_, Penulis>(
        "SELECT id, ketpub_id, nama FROM penulis WHERE ketpub_id = ? ORDER BY id",
    )
    .bind(ketpub_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        log::error!("DB select penulis error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data penulis").into()
    })
}

/// Daftar ketpub milik pemanggil, masing-masing dengan daftar penulisnya.
#[get("/api/ketpub")]
pub async fn get_ketpub_list(pool: web::Data<SqlitePool>, req: HttpRequest) -> Result<HttpResponse> {
    let claims = auth::verify_jwt(&req)?;

    let list = sqlx::query_as::<_, Ketpub>(&format!(
        "SELECT {KETPUB_COLUMNS} FROM ketpub WHERE user_id = ? ORDER BY id"
    ))
    .bind(&claims.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("DB select ketpub error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data")
    })?;

    let penulis = sqlx::query_as::<_, Penulis>(
        r#"
        SELECT p.id, p.ketpub_id, p.nama
        FROM penulis p
        JOIN ketpub k ON p.ketpub_id = k.id
        WHERE k.user_id = ?
        ORDER BY p.id
        "#,
    )
    .bind(&claims.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("DB select penulis error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data penulis")
    })?;

    let mut per_ketpub: HashMap<i64, Vec<Penulis>> = HashMap::new();
    for p in penulis {
        per_ketpub.entry(p.ketpub_id).or_default().push(p);
    }

    let data: Vec<KetpubWithPenulis> = list
        .into_iter()
        .map(|ketpub| {
            let penulis = per_ketpub.remove(&ketpub.id).unwrap_or_default();
            KetpubWithPenulis { ketpub, penulis }
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": data
    })))
}

/// Pengajuan baru. Induk + penulis + notifikasi admin dalam satu transaksi;
/// pemilik selalu diambil dari identitas token, bukan dari form.
#[post("/api/ketpub")]
pub async fn create_ketpub(
    pool: web::Data<SqlitePool>,
    form: web::Json<KetpubForm>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let claims = auth::verify_jwt(&req)?;

    if Role::parse(&claims.role) != Some(Role::Dosen) {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya dosen yang dapat membuat pengajuan",
        ));
    }

    let errors = validate_ketpub_form(&form, true);
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "status": "error",
            "errors": errors
        })));
    }

    // Sudah lolos validasi format di atas.
    let tanggal = NaiveDate::parse_from_str(form.tanggal.as_deref().unwrap_or("").trim(), "%Y-%m-%d")
        .map_err(|_| actix_web::error::ErrorBadRequest("Kolom tanggal harus berformat YYYY-MM-DD"))?;

    let mut transaction = pool.begin().await.map_err(|e| {
        log::error!("DB transaction error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal memulai transaksi database")
    })?;

    let query = r#"
        INSERT INTO ketpub
        (user_id, judul, nama_penerbit, penerbit, volume, nomor, bulan, tahun,
         akreditas, issn, tanggal, status_surat)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending')
    "#;

    let res = sqlx::query(query)
        .bind(&claims.user_id)
        .bind(form.judul.as_deref().unwrap_or("").trim())
        .bind(form.nama_penerbit.as_deref().unwrap_or("").trim())
        .bind(form.penerbit.as_deref().unwrap_or("").trim())
        .bind(form.volume.as_deref().unwrap_or("").trim())
        .bind(form.nomor.as_deref().unwrap_or("").trim())
        .bind(form.bulan.as_deref().unwrap_or("").trim())
        .bind(form.tahun.as_deref().unwrap_or("").trim())
        .bind(form.akreditas.as_deref().unwrap_or("").trim())
        .bind(form.issn.as_deref().unwrap_or("").trim())
        .bind(tanggal)
        .execute(&mut *transaction)
        .await
        .map_err(|e| {
            log::error!("DB insert ketpub error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menyimpan data")
        })?;

    let ketpub_id = res.last_insert_rowid();

    for nama in form.nama_penulis() {
        sqlx::query("INSERT INTO penulis (ketpub_id, nama) VALUES (?, ?)")
            .bind(ketpub_id)
            .bind(&nama)
            .execute(&mut *transaction)
            .await
            .map_err(|e| {
                log::error!("DB insert penulis error: {:?}", e);
                actix_web::error::ErrorInternalServerError("Gagal menyimpan data penulis")
            })?;
    }

    // Fan-out notifikasi: satu baris per user admin.
    let admins = sqlx::query_as::<_, (String,)>("SELECT id FROM users WHERE role = 'admin'")
        .fetch_all(&mut *transaction)
        .await
        .map_err(|e| {
            log::error!("DB select admin error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal mengambil daftar admin")
        })?;

    for (admin_id,) in admins {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, status)
            VALUES (?, 'Pengajuan Baru',
                    'Dosen telah membuat pengajuan surat Keterangan Publikasi.', 'unread')
            "#,
        )
        .bind(&admin_id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| {
            log::error!("DB insert notification error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menyimpan notifikasi")
        })?;
    }

    transaction.commit().await.map_err(|e| {
        log::error!("DB commit error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menyelesaikan transaksi")
    })?;

    let ketpub = fetch_ketpub(pool.get_ref(), ketpub_id).await?;
    let penulis = fetch_penulis(pool.get_ref(), ketpub_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Data berhasil disimpan",
        "data": KetpubWithPenulis { ketpub, penulis }
    })))
}

/// Tampilan detail. Varian payload dipilih dari role pemanggil; role di luar
/// admin/dosen ditolak eksplisit.
#[get("/api/ketpub/{id}")]
pub async fn get_ketpub_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let claims = auth::verify_jwt(&req)?;
    let role = Role::parse(&claims.role)
        .ok_or_else(|| actix_web::error::ErrorForbidden("Role tidak dikenal"))?;

    let ketpub = fetch_ketpub(pool.get_ref(), path.into_inner()).await?;
    let penulis = fetch_penulis(pool.get_ref(), ketpub.id).await?;
    let tahun_pengajuan = ketpub.tanggal.year();

    match role {
        Role::Admin => {
            let pemilik = sqlx::query_as::<_, (String, String)>(
                "SELECT name, email FROM users WHERE id = ?",
            )
            .bind(&ketpub.user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("DB select user error: {:?}", e);
                actix_web::error::ErrorInternalServerError("Gagal mengambil data pemilik")
            })?;

            let (nama_pemilik, email_pemilik) =
                pemilik.unwrap_or_else(|| ("-".to_string(), "-".to_string()));

            Ok(HttpResponse::Ok().json(json!({
                "status": "success",
                "view": "admin",
                "tahun_pengajuan": tahun_pengajuan,
                "pemilik": { "nama": nama_pemilik, "email": email_pemilik },
                "data": KetpubWithPenulis { ketpub, penulis }
            })))
        }
        Role::Dosen => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "view": "dosen",
            "tahun_pengajuan": tahun_pengajuan,
            "data": KetpubWithPenulis { ketpub, penulis }
        }))),
    }
}

/// Update field skalar + ganti total daftar penulis dalam satu transaksi.
/// Status surat, nomor surat, dan pemilik tidak pernah disentuh di sini.
#[put("/api/ketpub/{id}")]
pub async fn update_ketpub(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    form: web::Json<KetpubForm>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    auth::verify_jwt(&req)?;

    let errors = validate_ketpub_form(&form, false);
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "status": "error",
            "errors": errors
        })));
    }

    let ketpub = fetch_ketpub(pool.get_ref(), path.into_inner()).await?;

    let mut transaction = pool.begin().await.map_err(|e| {
        log::error!("DB transaction error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal memulai transaksi database")
    })?;

    // Penulis lama dibuang seluruhnya lalu diisi ulang dari form.
    sqlx::query("DELETE FROM penulis WHERE ketpub_id = ?")
        .bind(ketpub.id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| {
            log::error!("DB delete penulis error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menghapus penulis lama")
        })?;

    for nama in form.nama_penulis() {
        sqlx::query("INSERT INTO penulis (ketpub_id, nama) VALUES (?, ?)")
            .bind(ketpub.id)
            .bind(&nama)
            .execute(&mut *transaction)
            .await
            .map_err(|e| {
                log::error!("DB insert penulis error: {:?}", e);
                actix_web::error::ErrorInternalServerError("Gagal menyimpan data penulis")
            })?;
    }

    let query = r#"
        UPDATE ketpub
        SET judul = ?, nama_penerbit = ?, penerbit = ?, volume = ?, nomor = ?,
            bulan = ?, tahun = ?, akreditas = ?, issn = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
    "#;

    sqlx::query(query)
        .bind(form.judul.as_deref().unwrap_or("").trim())
        .bind(form.nama_penerbit.as_deref().unwrap_or("").trim())
        .bind(form.penerbit.as_deref().unwrap_or("").trim())
        .bind(form.volume.as_deref().unwrap_or("").trim())
        .bind(form.nomor.as_deref().unwrap_or("").trim())
        .bind(form.bulan.as_deref().unwrap_or("").trim())
        .bind(form.tahun.as_deref().unwrap_or("").trim())
        .bind(form.akreditas.as_deref().unwrap_or("").trim())
        .bind(form.issn.as_deref().unwrap_or("").trim())
        .bind(ketpub.id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| {
            log::error!("DB update ketpub error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal mengupdate data")
        })?;

    transaction.commit().await.map_err(|e| {
        log::error!("DB commit error: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menyelesaikan transaksi")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Data berhasil diupdate"
    })))
}

#[delete("/api/ketpub/{id}")]
pub async fn delete_ketpub(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    auth::verify_jwt(&req)?;

    let ketpub = fetch_ketpub(pool.get_ref(), path.into_inner()).await?;

    // Cascade menghapus baris penulis.
    sqlx::query("DELETE FROM ketpub WHERE id = ?")
        .bind(ketpub.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("DB delete ketpub error: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menghapus data")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Data berhasil dihapus"
    })))
}

fn template_path() -> PathBuf {
    env::var("KETPUB_TEMPLATE")
        .unwrap_or_else(|_| "templates/suratKetPub.docx".to_string())
        .into()
}

/// Ekspor surat Keterangan Publikasi ke .docx dan kirim sebagai unduhan.
#[get("/api/ketpub/{id}/download")]
pub async fn download_ketpub(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    auth::verify_jwt(&req)?;

    let ketpub = fetch_ketpub(pool.get_ref(), path.into_inner()).await?;
    let penulis = fetch_penulis(pool.get_ref(), ketpub.id).await?;

    let bytes = export::render_surat(&template_path(), &ketpub, &penulis).map_err(|e| {
        log::error!("Gagal membuat dokumen ketpub {}: {}", ketpub.id, e);
        actix_web::error::ErrorInternalServerError("Gagal membuat dokumen")
    })?;

    // Nama file diturunkan dari id record, bukan dari nama penulis.
    let filename = format!("Surat_Keterangan_Publikasi_{}.docx", ketpub.id);

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}
