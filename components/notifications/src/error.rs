/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Error types for the notifications component.
//!
//! [`NotificationError`] is the internal error type; functions inside
//! `internal` return `Result<T, NotificationError>`. The public API exposes
//! the reduced [`NotificationApiError`], converting at the `lib.rs` boundary
//! and logging the internal detail on the way through.

pub type Result<T> = std::result::Result<T, NotificationError>;
pub type ApiResult<T> = std::result::Result<T, NotificationApiError>;

/// The error type exposed to consumers of the component.
#[derive(Debug, thiserror::Error)]
pub enum NotificationApiError {
    /// The persisted state could not be opened or written.
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    /// Catch-all for everything else.
    #[error("Unexpected notification error: {reason}")]
    Other { reason: String },
}

/// The error type used throughout the internals of the component.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// An unspecified general error has occurred.
    #[error("General error: {0}")]
    GeneralError(String),

    /// A platform plugin (notification display, haptics, registration)
    /// reported a failure.
    #[error("Bridge error: {0}")]
    BridgeError(String),

    /// A client-side communication failure talking to the backend.
    #[error("Communication error: {0}")]
    CommunicationError(String),

    /// The backend answered with an error status.
    #[error("Communication server error: {0}")]
    CommunicationServerError(String),

    /// An error with storage that isn't a raw SQL error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A failure to encode data to/from storage or the wire.
    #[error("Transcoding error: {0}")]
    TranscodingError(#[from] serde_json::Error),

    #[error("Error executing SQL: {0}")]
    StorageSqlError(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

// Reports the internal error and maps it onto the public surface. Errors
// cross this boundary exactly once, so this is also where they get logged.
impl From<NotificationError> for NotificationApiError {
    fn from(e: NotificationError) -> Self {
        log::error!("notifications error: {}", e);
        match e {
            NotificationError::StorageError(reason) => NotificationApiError::StorageError { reason },
            NotificationError::StorageSqlError(e) => NotificationApiError::StorageError {
                reason: e.to_string(),
            },
            other => NotificationApiError::Other {
                reason: other.to_string(),
            },
        }
    }
}
