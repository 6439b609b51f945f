use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// A resident record. JSON field names match the public API: photo fields
/// are camelCase, the rest are plain Indonesian terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penduduk {
    pub id: i64,
    pub nik: String,
    pub nama: String,
    pub alamat: String,
    pub nohp: String,
    #[serde(rename = "fotoKK")]
    pub foto_kk: String,
    #[serde(rename = "fotoDiri")]
    pub foto_diri: String,
    #[serde(rename = "fotoDepanRumah")]
    pub foto_depan_rumah: String,
    pub lokasi: String,
    pub keterangan: String,
}

/// Text fields of a create/update request. `None` on update means
/// "keep the stored value".
#[derive(Debug, Clone, Default)]
pub struct PendudukFields {
    pub nik: Option<String>,
    pub nama: Option<String>,
    pub alamat: Option<String>,
    pub nohp: Option<String>,
    pub lokasi: Option<String>,
    pub keterangan: Option<String>,
}

/// Stored filenames assigned to the photo parts of one request. A `None`
/// slot means the part was absent and the stored value is kept.
#[derive(Debug, Clone, Default)]
pub struct PhotoSet {
    pub foto_kk: Option<String>,
    pub foto_diri: Option<String>,
    pub foto_depan_rumah: Option<String>,
}
