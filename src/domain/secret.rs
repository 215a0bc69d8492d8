//! Credential secret handles and field references.
//!
//! A relational data tier generates a credential secret at provisioning time.
//! Consumers reference individual fields of that secret; the reference stays
//! opaque until the compute runtime starts, and the composition layer never
//! sees a plaintext value.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ReferenceError;

/// Fields every generated credential secret carries.
pub const KNOWN_SECRET_FIELDS: &[&str] = &["username", "password", "dbname", "host", "port"];

/// Operator-declared reference to one field of a tier's generated secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFieldRef {
    /// Name of the data tier whose secret is referenced.
    pub from: String,
    /// Field inside the secret, e.g. `password`.
    pub field: String,
}

impl SecretFieldRef {
    /// Check the field against the known secret schema.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::UnknownSecretField`] for a field outside the
    /// generated secret's schema.
    pub fn validate(&self) -> Result<()> {
        if KNOWN_SECRET_FIELDS.contains(&self.field.as_str()) {
            return Ok(());
        }
        Err(ReferenceError::UnknownSecretField {
            secret: self.from.clone(),
            field: self.field.clone(),
            known: KNOWN_SECRET_FIELDS.join(", "),
        }
        .into())
    }
}
