use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_xlsxwriter::Workbook;

use crate::db::models::Penduduk;
use crate::db::penduduk;
use crate::error::AppResult;
use crate::state::DbPool;

pub const EXPORT_FILENAME: &str = "data_penduduk.xlsx";

const HEADER: [&str; 10] = [
    "No",
    "NIK",
    "Nama",
    "Alamat",
    "No HP",
    "Foto KK",
    "Foto Diri",
    "Foto Depan Rumah",
    "Lokasi",
    "Keterangan",
];

/// Export every record to an xlsx workbook held entirely in memory, so
/// concurrent exports never contend on a shared file.
pub fn export_all(pool: &DbPool, uploads_dir: &Path) -> AppResult<Vec<u8>> {
    let records = penduduk::list(pool)?;
    let rows = sheet_rows(&records, uploads_dir)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Penduduk")?;

    for (col, title) in HEADER.iter().enumerate() {
        worksheet.write(0, col as u16, *title)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write(r, 0, (i + 1) as u32)?;
        for (col, cell) in row.iter().enumerate().skip(1) {
            worksheet.write(r, col as u16, cell.as_str())?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// One sheet row per record in list order. Column 0 is filled in later
/// with the 1-based row number; photo columns carry the base64 of the
/// referenced file's bytes, or stay empty when no file is referenced.
/// A referenced file missing from disk is an error, not an empty cell.
fn sheet_rows(records: &[Penduduk], uploads_dir: &Path) -> AppResult<Vec<[String; 10]>> {
    records
        .iter()
        .map(|p| {
            Ok([
                String::new(),
                p.nik.clone(),
                p.nama.clone(),
                p.alamat.clone(),
                p.nohp.clone(),
                photo_cell(uploads_dir, &p.foto_kk)?,
                photo_cell(uploads_dir, &p.foto_diri)?,
                photo_cell(uploads_dir, &p.foto_depan_rumah)?,
                p.lokasi.clone(),
                p.keterangan.clone(),
            ])
        })
        .collect()
}

fn photo_cell(uploads_dir: &Path, filename: &str) -> AppResult<String> {
    if filename.is_empty() {
        return Ok(String::new());
    }
    let bytes = std::fs::read(uploads_dir.join(filename))?;
    Ok(BASE64.encode(bytes))
}
