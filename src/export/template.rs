use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("baris tabel dengan placeholder ${{{0}}} tidak ditemukan di template")]
    RowNotFound(String),
    #[error("template tidak memuat word/document.xml")]
    MissingDocument,
    #[error("gagal membaca paket dokumen: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("gagal menulis dokumen: {0}")]
    Io(#[from] std::io::Error),
    #[error("isi dokumen bukan UTF-8 yang valid: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Pengolah placeholder di atas isi `word/document.xml`.
///
/// Kontrak template: placeholder skalar `${nama}`, dan satu baris tabel
/// (`<w:tr>`) berulang yang digandakan per item; placeholder di baris hasil
/// penggandaan mendapat akhiran indeks 1-based, `${x}` menjadi `${x#1}`,
/// `${x#2}`, dst.
pub struct TemplateProcessor {
    xml: String,
}

impl TemplateProcessor {
    pub fn new(xml: String) -> Self {
        Self { xml }
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Mengisi semua kemunculan `${name}` dengan `value` (di-escape XML).
    /// Placeholder yang tidak ada di template diabaikan.
    pub fn set_value(&mut self, name: &str, value: &str) {
        let needle = format!("${{{name}}}");
        if self.xml.contains(&needle) {
            self.xml = self.xml.replace(&needle, &escape_xml(value));
        }
    }

    /// Menggandakan baris tabel yang memuat `${name}` sebanyak `count` kali.
    /// `count` nol menghapus barisnya.
    pub fn clone_row(&mut self, name: &str, count: usize) -> Result<(), TemplateError> {
        let needle = format!("${{{name}}}");
        let pos = self
            .xml
            .find(&needle)
            .ok_or_else(|| TemplateError::RowNotFound(name.to_string()))?;
        let start = find_row_start(&self.xml, pos)
            .ok_or_else(|| TemplateError::RowNotFound(name.to_string()))?;
        let end = pos
            + self.xml[pos..]
                .find("</w:tr>")
                .ok_or_else(|| TemplateError::RowNotFound(name.to_string()))?
            + "</w:tr>".len();

        let row = self.xml[start..end].to_string();
        let mut cloned = String::with_capacity(row.len() * count);
        for index in 1..=count {
            cloned.push_str(&suffix_placeholders(&row, index));
        }
        self.xml.replace_range(start..end, &cloned);
        Ok(())
    }
}

/// Tag pembuka `<w:tr>` terakhir sebelum `before`. Harus batas tag utuh:
/// `<w:tr>` atau `<w:tr ...>`, bukan elemen lain berawalan sama seperti
/// `<w:trPr>` yang ada di dalam baris.
fn find_row_start(xml: &str, before: usize) -> Option<usize> {
    let mut search_end = before;
    while let Some(idx) = xml[..search_end].rfind("<w:tr") {
        match xml.as_bytes().get(idx + "<w:tr".len()) {
            Some(b'>') | Some(b' ') => return Some(idx),
            _ => search_end = idx,
        }
    }
    None
}

/// `${x}` -> `${x#index}` untuk semua placeholder di satu baris.
fn suffix_placeholders(row: &str, index: usize) -> String {
    let mut out = String::with_capacity(row.len() + 16);
    let mut rest = row;
    while let Some(open) = rest.find("${") {
        match rest[open..].find('}') {
            Some(close_rel) => {
                let close = open + close_rel;
                out.push_str(&rest[..close]);
                out.push('#');
                out.push_str(&index.to_string());
                out.push('}');
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
