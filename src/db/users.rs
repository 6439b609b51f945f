use rusqlite::{params, OptionalExtension};

use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Demo accounts provisioned on first startup. A production deployment
/// would replace these with externally managed credentials.
const SEED_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin", "admin123", Role::Admin),
    ("member", "member123", Role::Member),
];

pub fn seed_users(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;
    for (username, password, role) in SEED_ACCOUNTS {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        if exists {
            continue;
        }
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, hash, role.as_str()],
        )?;
        tracing::info!("Seeded account '{}'", username);
    }
    Ok(())
}

pub fn find_by_username(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
            params![username],
            |row| {
                let role_str: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: Role::parse(&role_str).unwrap_or(Role::Member),
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Verify a login attempt. Unknown usernames and wrong passwords both fail
/// with 400 but carry distinct messages, matching the public API contract.
pub fn verify_credentials(pool: &DbPool, username: &str, password: &str) -> AppResult<User> {
    let user = find_by_username(pool, username)?
        .ok_or_else(|| AppError::BadRequest("User not found".into()))?;

    let ok = bcrypt::verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("bcrypt verify failed: {}", e)))?;
    if !ok {
        return Err(AppError::BadRequest("Wrong password".into()));
    }
    Ok(user)
}
