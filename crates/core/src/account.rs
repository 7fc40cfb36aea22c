//! Login and role entries stored under `usuarios/`.

use serde::{Deserialize, Serialize};

use crate::paths::sanitize_email_key;

/// One login/role entry, keyed by the sanitized email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccountEntry {
    pub nombre: String,
    pub correo: String,
    pub rol: String,
    /// Argon2 PHC string. Absent for accounts that cannot log in yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl UserAccountEntry {
    pub fn key(&self) -> String {
        sanitize_email_key(&self.correo)
    }

    pub fn can_log_in(&self) -> bool {
        self.password_hash.is_some()
    }
}
