// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model store operations.

use crate::keys::{MeshId, ModelKey};

/// Result type alias for model store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during model store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A referenced id has no live entry (stale id, double removal).
    #[error("entity not found: {0:?}")]
    NotFound(ModelKey),

    /// The mesh exists but carries no user data under the given key.
    #[error("user data '{key}' not found on {mesh}")]
    UserDataNotFound { mesh: MeshId, key: String },

    /// Internal bookkeeping is inconsistent. Never expected under correct use.
    #[error("model invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Returns `true` for the recoverable "no live entry" failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::UserDataNotFound { .. })
    }
}
