use chrono::Datelike;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::models::ketpub::{Ketpub, Penulis};
use crate::utils;

pub mod template;

pub use template::{TemplateError, TemplateProcessor};

/// Paket template .docx: entri OOXML apa adanya, plus `word/document.xml`
/// yang diolah lewat [`TemplateProcessor`].
pub struct DocxTemplate {
    entries: Vec<(String, Vec<u8>)>,
    processor: TemplateProcessor,
}

impl DocxTemplate {
    pub fn open(path: &Path) -> Result<Self, TemplateError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut document = None;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            if entry.name() == "word/document.xml" {
                document = Some(String::from_utf8(buf)?);
            } else {
                entries.push((entry.name().to_string(), buf));
            }
        }

        let xml = document.ok_or(TemplateError::MissingDocument)?;
        Ok(Self {
            entries,
            processor: TemplateProcessor::new(xml),
        })
    }

    pub fn set_value(&mut self, name: &str, value: &str) {
        self.processor.set_value(name, value);
    }

    pub fn clone_row(&mut self, name: &str, count: usize) -> Result<(), TemplateError> {
        self.processor.clone_row(name, count)
    }

    pub fn save_as(&self, path: &Path) -> Result<(), TemplateError> {
        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (name, data) in &self.entries {
            writer.start_file(name.clone(), options)?;
            writer.write_all(data)?;
        }
        writer.start_file("word/document.xml", options)?;
        writer.write_all(self.processor.xml().as_bytes())?;
        writer.finish()?;
        Ok(())
    }
}

/// Artefak sementara yang pasti dihapus di semua jalur keluar.
struct TempArtifact(PathBuf);

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Gagal menghapus file sementara {:?}: {}", self.0, e);
            }
        }
    }
}

/// Mengisi template surat Keterangan Publikasi dan mengembalikan isi .docx
/// jadi. Baris tabel `no` digandakan sebanyak jumlah penulis; nama kosong
/// dan nomor surat yang belum terbit diisi tanda strip.
pub fn render_surat(
    template_path: &Path,
    ketpub: &Ketpub,
    penulis: &[Penulis],
) -> Result<Vec<u8>, TemplateError> {
    let mut doc = DocxTemplate::open(template_path)?;

    let tanggal = utils::format_tanggal_panjang(ketpub.tanggal);
    let tahun = ketpub.tanggal.year().to_string();

    doc.set_value("nomorSurat", ketpub.nomor_surat.as_deref().unwrap_or("-"));
    doc.set_value("judul", &ketpub.judul);
    doc.set_value("namaPenerbit", &ketpub.nama_penerbit);
    doc.set_value("penerbit", &ketpub.penerbit);
    doc.set_value("volume", &ketpub.volume);
    doc.set_value("nomor", &ketpub.nomor);
    doc.set_value("bulan", &ketpub.bulan);
    doc.set_value("akreditas", &ketpub.akreditas);
    doc.set_value("issn", &ketpub.issn);
    doc.set_value("tanggal", &tanggal);
    // Tahun yang dicetak adalah tahun dari tanggal pengajuan, bukan kolom
    // bibliografi `tahun`.
    doc.set_value("tahun", &tahun);

    doc.clone_row("no", penulis.len())?;
    for (index, penulis) in penulis.iter().enumerate() {
        let row = index + 1;
        doc.set_value(&format!("no#{row}"), &row.to_string());
        let nama = penulis.nama.trim();
        doc.set_value(
            &format!("namaPenulis#{row}"),
            if nama.is_empty() { "-" } else { nama },
        );
    }

    let path = std::env::temp_dir().join(format!("surat-ketpub-{}.docx", Uuid::new_v4()));
    let artifact = TempArtifact(path.clone());
    doc.save_as(&path)?;
    let bytes = std::fs::read(&path)?;
    drop(artifact);

    Ok(bytes)
}
