use chrono::{Datelike, NaiveDate};

pub const NAMA_BULAN: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format tanggal panjang Indonesia, mis. "5 Maret 2024".
pub fn format_tanggal_panjang(tanggal: NaiveDate) -> String {
    format!(
        "{} {} {}",
        tanggal.day(),
        NAMA_BULAN[tanggal.month0() as usize],
        tanggal.year()
    )
}
