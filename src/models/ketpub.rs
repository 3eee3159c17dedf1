use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Ketpub {
    pub id: i64,
    pub user_id: String,
    pub judul: String,
    pub nama_penerbit: String,
    pub penerbit: String,
    pub volume: String,
    pub nomor: String,
    pub bulan: String,
    pub tahun: String,
    pub akreditas: String,
    pub issn: String,
    pub tanggal: NaiveDate,
    pub status_surat: String,
    pub nomor_surat: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Penulis {
    pub id: i64,
    pub ketpub_id: i64,
    pub nama: String,
}

#[derive(Debug, Serialize)]
pub struct KetpubWithPenulis {
    #[serde(flatten)]
    pub ketpub: Ketpub,
    pub penulis: Vec<Penulis>,
}

#[derive(Debug, Deserialize)]
pub struct PenulisIn {
    pub nama: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KetpubForm {
    pub judul: Option<String>,
    #[serde(alias = "namaPenerbit")]
    pub nama_penerbit: Option<String>,
    pub penerbit: Option<String>,
    pub volume: Option<String>,
    pub nomor: Option<String>,
    pub bulan: Option<String>,
    pub tahun: Option<String>,
    pub akreditas: Option<String>,
    pub issn: Option<String>,
    pub tanggal: Option<String>,
    pub penulis: Option<Vec<PenulisIn>>,
}

impl KetpubForm {
    /// Nama penulis yang dipakai: entri dengan nama kosong dibuang diam-diam,
    /// urutan kiriman dipertahankan.
    pub fn nama_penulis(&self) -> Vec<String> {
        self.penulis
            .iter()
            .flatten()
            .filter_map(|p| p.nama.as_deref())
            .map(str::trim)
            .filter(|nama| !nama.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn wajib(errors: &mut BTreeMap<&'static str, String>, field: &'static str, value: &Option<String>) {
    if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.insert(field, format!("Kolom {} wajib diisi", field));
    }
}

fn wajib_min5(
    errors: &mut BTreeMap<&'static str, String>,
    field: &'static str,
    value: &Option<String>,
) {
    let value = value.as_deref().map(str::trim).unwrap_or("");
    if value.is_empty() {
        errors.insert(field, format!("Kolom {} wajib diisi", field));
    } else if value.chars().count() < 5 {
        errors.insert(field, format!("Kolom {} minimal 5 karakter", field));
    }
}

/// Validasi field ketpub. Pada update, `tanggal` tidak ikut divalidasi
/// karena tanggal pengajuan tidak pernah diubah lewat update.
pub fn validate_ketpub_form(
    form: &KetpubForm,
    require_tanggal: bool,
) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    wajib(&mut errors, "judul", &form.judul);
    wajib_min5(&mut errors, "nama_penerbit", &form.nama_penerbit);
    wajib_min5(&mut errors, "penerbit", &form.penerbit);
    wajib(&mut errors, "volume", &form.volume);
    wajib(&mut errors, "nomor", &form.nomor);
    wajib(&mut errors, "bulan", &form.bulan);
    wajib(&mut errors, "tahun", &form.tahun);
    wajib_min5(&mut errors, "akreditas", &form.akreditas);
    wajib_min5(&mut errors, "issn", &form.issn);

    if require_tanggal {
        match form.tanggal.as_deref().map(str::trim) {
            None | Some("") => {
                errors.insert("tanggal", "Kolom tanggal wajib diisi".to_string());
            }
            Some(tanggal) => {
                if NaiveDate::parse_from_str(tanggal, "%Y-%m-%d").is_err() {
                    errors.insert(
                        "tanggal",
                        "Kolom tanggal harus berformat YYYY-MM-DD".to_string(),
                    );
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_lengkap() -> KetpubForm {
        KetpubForm {
            judul: Some("Paper X".into()),
            nama_penerbit: Some("Elsevier".into()),
            penerbit: Some("Elsevier BV".into()),
            volume: Some("12".into()),
            nomor: Some("3".into()),
            bulan: Some("Jan".into()),
            tahun: Some("2024".into()),
            akreditas: Some("Sinta 2".into()),
            issn: Some("1234-5678".into()),
            tanggal: Some("2024-01-15".into()),
            penulis: None,
        }
    }

    #[test]
    fn form_lengkap_lolos_validasi() {
        assert!(validate_ketpub_form(&form_lengkap(), true).is_empty());
    }

    #[test]
    fn field_kosong_masuk_daftar_error() {
        let mut form = form_lengkap();
        form.judul = None;
        form.issn = Some("   ".into());

        let errors = validate_ketpub_form(&form, true);
        assert!(errors.contains_key("judul"));
        assert!(errors.contains_key("issn"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn aturan_minimal_lima_karakter() {
        let mut form = form_lengkap();
        form.akreditas = Some("S2".into());

        let errors = validate_ketpub_form(&form, true);
        assert_eq!(
            errors.get("akreditas").map(String::as_str),
            Some("Kolom akreditas minimal 5 karakter")
        );
    }

    #[test]
    fn tanggal_salah_format_ditolak_hanya_saat_diwajibkan() {
        let mut form = form_lengkap();
        form.tanggal = Some("15-01-2024".into());

        assert!(validate_ketpub_form(&form, true).contains_key("tanggal"));
        assert!(validate_ketpub_form(&form, false).is_empty());
    }

    #[test]
    fn nama_penulis_membuang_entri_kosong_dan_menjaga_urutan() {
        let mut form = form_lengkap();
        form.penulis = Some(vec![
            PenulisIn {
                nama: Some("A. Author".into()),
            },
            PenulisIn {
                nama: Some("   ".into()),
            },
            PenulisIn { nama: None },
            PenulisIn {
                nama: Some("B. Writer".into()),
            },
        ]);

        assert_eq!(form.nama_penulis(), vec!["A. Author", "B. Writer"]);
    }
}
