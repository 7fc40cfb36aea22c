//! First-start administrator provisioning.

use ipa_core::account::UserAccountEntry;
use ipa_core::roles::ROLE_ADMIN;
use ipa_db::repositories::UserRepo;
use ipa_db::RecordStore;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured administrator unless an account with that email
/// already exists. Returns whether an account was created.
pub async fn ensure_admin(store: &dyn RecordStore, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::find_by_email(store, &admin.email).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    let entry = UserAccountEntry {
        nombre: admin.name.clone(),
        correo: admin.email.clone(),
        rol: ROLE_ADMIN.to_string(),
        password_hash: Some(password_hash),
    };
    let key = UserRepo::save(store, &entry).await?;
    tracing::info!(key = %key, "Bootstrap administrator created");
    Ok(true)
}
