/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Provides configuration for the [NotificationManager](`crate::NotificationManager`)

use std::{fmt::Display, str::FromStr};

use crate::error::NotificationError;

/// Used when no VAPID application server key has been configured. A web push
/// subscription built with this value will fail against a real push service;
/// registration then resolves to `None` rather than erroring.
pub const PLACEHOLDER_VAPID_KEY: &str = "YOUR_VAPID_PUBLIC_KEY";

/// The platforms the component runs on.
///
/// Web uses the browser Notification / PushManager APIs; Android and Ios go
/// through the native local-notification and push plugins. The platform is
/// fixed for the lifetime of the process and decides which side of every
/// web-vs-native branch the manager takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Platform {
    Web,
    Android,
    Ios,
}

impl Platform {
    pub fn is_web(&self) -> bool {
        matches!(self, Platform::Web)
    }
}

#[cfg(test)]
// To avoid a future footgun, the default implementation is only for tests
impl Default for Platform {
    fn default() -> Self {
        Self::Web
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Platform::Web => "web",
                Platform::Android => "android",
                Platform::Ios => "ios",
            }
        )
    }
}

impl FromStr for Platform {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "web" => Platform::Web,
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => return Err(NotificationError::GeneralError("Invalid platform".to_string())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Protocol {
    Https,
    Http,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Protocol::Http => "http",
                Protocol::Https => "https",
            }
        )
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Https
    }
}

impl FromStr for Protocol {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            _ => return Err(NotificationError::GeneralError("Invalid protocol".to_string())),
        })
    }
}

#[derive(Clone, Debug)]
pub struct NotificationConfiguration {
    /// The platform this process runs on.
    pub platform: Platform,

    /// Backend host name:port for token registration.
    pub server_host: String,

    /// http protocol (mobile uses "https")
    pub http_protocol: Protocol,

    /// base64url-encoded VAPID application server key for web push; `None`
    /// falls back to [`PLACEHOLDER_VAPID_KEY`].
    pub vapid_public_key: Option<String>,

    /// Reported to the backend alongside the registration token.
    pub app_version: String,

    /// Sound asset attached to native local notifications.
    pub sound_file: String,

    /// OS path to the database.
    pub database_path: String,
}

#[cfg(test)]
impl Default for NotificationConfiguration {
    fn default() -> NotificationConfiguration {
        NotificationConfiguration {
            platform: Platform::default(),
            server_host: String::from("api.plattr.com"),
            http_protocol: Protocol::Https,
            vapid_public_key: None,
            app_version: String::from("1.0.0"),
            sound_file: String::from("beep.wav"),
            database_path: String::from(""),
        }
    }
}
