use std::path::Path;

use axum::extract::Multipart;

use crate::db::models::{PendudukFields, PhotoSet};
use crate::error::AppResult;

/// Drain a multipart request into text fields and stored photo files.
///
/// Text parts fill `PendudukFields`; file parts named `fotoKK`, `fotoDiri`
/// or `fotoDepanRumah` are written to `uploads_dir` under a fresh name and
/// their assigned filenames returned in `PhotoSet`. Parts that are absent
/// stay `None` so the record store can merge. Unknown part names are
/// ignored; a file part with an empty original filename (an empty form
/// input) counts as absent.
pub async fn collect(
    multipart: &mut Multipart,
    uploads_dir: &Path,
) -> AppResult<(PendudukFields, PhotoSet)> {
    let mut fields = PendudukFields::default();
    let mut photos = PhotoSet::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "nik" => fields.nik = Some(field.text().await?),
            "nama" => fields.nama = Some(field.text().await?),
            "alamat" => fields.alamat = Some(field.text().await?),
            "nohp" => fields.nohp = Some(field.text().await?),
            "lokasi" => fields.lokasi = Some(field.text().await?),
            "keterangan" => fields.keterangan = Some(field.text().await?),
            "fotoKK" | "fotoDiri" | "fotoDepanRumah" => {
                let original = field.file_name().map(str::to_string);
                if original.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                let stored = stored_name(original.as_deref());
                let bytes = field.bytes().await?;
                std::fs::write(uploads_dir.join(&stored), &bytes)?;
                tracing::debug!("stored upload {} as {}", name, stored);
                match name.as_str() {
                    "fotoKK" => photos.foto_kk = Some(stored),
                    "fotoDiri" => photos.foto_diri = Some(stored),
                    _ => photos.foto_depan_rumah = Some(stored),
                }
            }
            _ => {}
        }
    }

    Ok((fields, photos))
}

/// Assign a durable filename: a fresh UUIDv7 plus the original extension.
/// Unlike timestamp naming, two uploads in the same instant cannot collide.
fn stored_name(original: Option<&str>) -> String {
    let id = uuid::Uuid::now_v7();
    match original.map(Path::new).and_then(|p| p.extension()) {
        Some(ext) => format!("{}.{}", id, ext.to_string_lossy()),
        None => id.to_string(),
    }
}
