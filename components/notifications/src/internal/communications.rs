/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Server Communications.
//!
//! The component's only backend call: announcing a freshly acquired push
//! registration token so the server can route pushes to this device. The
//! call is fire-and-forget from the caller's perspective; registration
//! succeeds locally whether or not the backend accepted the token.

use serde_json::json;
use url::Url;

use crate::error::{
    NotificationError::{CommunicationError, CommunicationServerError},
    Result,
};
use crate::internal::config::{NotificationConfiguration, Platform};

/// A communication link to the notification backend.
#[cfg_attr(test, mockall::automock)]
pub trait Connection: Sized {
    /// Create a new instance of a [`Connection`]
    fn connect(options: NotificationConfiguration) -> Self;

    /// Tell the backend about a new push registration token for this device.
    fn register_token(&self, token: &str, platform: Platform, app_version: &str) -> Result<()>;
}

/// Talks to the backend over its HTTP interface.
pub struct ConnectHttp {
    options: NotificationConfiguration,
    client: reqwest::blocking::Client,
}

impl ConnectHttp {
    fn register_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}/api/notifications/register",
            self.options.http_protocol, self.options.server_host
        ))?)
    }
}

impl Connection for ConnectHttp {
    fn connect(options: NotificationConfiguration) -> ConnectHttp {
        ConnectHttp {
            options,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn register_token(&self, token: &str, platform: Platform, app_version: &str) -> Result<()> {
        let url = self.register_url()?;
        let body = json!({
            "token": token,
            "platform": platform.to_string(),
            "appVersion": app_version,
        });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .map_err(|e| CommunicationError(format!("Could not reach server: {}", e)))?;
        let status = response.status();
        if status.is_server_error() {
            return Err(CommunicationServerError(format!(
                "Server error registering token: {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(CommunicationError(format!(
                "Error registering token: {}",
                status
            )));
        }
        log::info!("Push token sent to backend");
        Ok(())
    }
}
