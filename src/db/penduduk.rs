use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::{Penduduk, PendudukFields, PhotoSet};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

const COLUMNS: &str =
    "id, nik, nama, alamat, nohp, foto_kk, foto_diri, foto_depan_rumah, lokasi, keterangan";

fn row_to_penduduk(row: &Row<'_>) -> rusqlite::Result<Penduduk> {
    Ok(Penduduk {
        id: row.get(0)?,
        nik: row.get(1)?,
        nama: row.get(2)?,
        alamat: row.get(3)?,
        nohp: row.get(4)?,
        foto_kk: row.get(5)?,
        foto_diri: row.get(6)?,
        foto_depan_rumah: row.get(7)?,
        lokasi: row.get(8)?,
        keterangan: row.get(9)?,
    })
}

/// All records in storage order. No pagination; the dataset is expected to
/// stay small.
pub fn list(pool: &DbPool) -> AppResult<Vec<Penduduk>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!("SELECT {} FROM penduduk", COLUMNS))?;
    let rows = stmt
        .query_map([], row_to_penduduk)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(pool: &DbPool, id: i64) -> AppResult<Option<Penduduk>> {
    let conn = pool.get()?;
    let record = conn
        .query_row(
            &format!("SELECT {} FROM penduduk WHERE id = ?1", COLUMNS),
            params![id],
            row_to_penduduk,
        )
        .optional()?;
    Ok(record)
}

/// Insert a new record. Absent fields and photo slots are stored empty.
/// Duplicate `nik` values are allowed.
pub fn create(pool: &DbPool, fields: PendudukFields, photos: PhotoSet) -> AppResult<i64> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO penduduk (nik, nama, alamat, nohp, foto_kk, foto_diri, foto_depan_rumah, lokasi, keterangan)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            fields.nik.unwrap_or_default(),
            fields.nama.unwrap_or_default(),
            fields.alamat.unwrap_or_default(),
            fields.nohp.unwrap_or_default(),
            photos.foto_kk.unwrap_or_default(),
            photos.foto_diri.unwrap_or_default(),
            photos.foto_depan_rumah.unwrap_or_default(),
            fields.lokasi.unwrap_or_default(),
            fields.keterangan.unwrap_or_default(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Merge-on-update: fields and photo slots absent from the request keep
/// their stored values. The read and write share one transaction so a
/// concurrent update or delete cannot interleave between them.
pub fn update(pool: &DbPool, id: i64, fields: PendudukFields, photos: PhotoSet) -> AppResult<()> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let existing = tx
        .query_row(
            &format!("SELECT {} FROM penduduk WHERE id = ?1", COLUMNS),
            params![id],
            row_to_penduduk,
        )
        .optional()?
        .ok_or(AppError::NotFound)?;

    tx.execute(
        "UPDATE penduduk SET nik = ?1, nama = ?2, alamat = ?3, nohp = ?4,
         foto_kk = ?5, foto_diri = ?6, foto_depan_rumah = ?7, lokasi = ?8, keterangan = ?9
         WHERE id = ?10",
        params![
            fields.nik.unwrap_or(existing.nik),
            fields.nama.unwrap_or(existing.nama),
            fields.alamat.unwrap_or(existing.alamat),
            fields.nohp.unwrap_or(existing.nohp),
            photos.foto_kk.unwrap_or(existing.foto_kk),
            photos.foto_diri.unwrap_or(existing.foto_diri),
            photos.foto_depan_rumah.unwrap_or(existing.foto_depan_rumah),
            fields.lokasi.unwrap_or(existing.lokasi),
            fields.keterangan.unwrap_or(existing.keterangan),
            id,
        ],
    )?;

    tx.commit()?;
    Ok(())
}

/// Remove the row only. Photo files referenced by the record are left in
/// the uploads directory.
pub fn delete(pool: &DbPool, id: i64) -> AppResult<()> {
    let conn = pool.get()?;
    let affected = conn.execute("DELETE FROM penduduk WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
