/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The platform seam.
//!
//! Everything the component needs from the host platform, from permission
//! prompts and OS notification display to push registration, haptics,
//! navigation, sound and badge, goes through the [`NotificationBridge`]
//! trait. The
//! embedding application supplies the implementation for its platform (the
//! browser Notification / PushManager APIs on web, the native
//! local-notification and push plugins on mobile); the manager decides which
//! operations to invoke based on the configured [`Platform`].
//!
//! Every operation returns a `Result`; the manager treats any failure as a
//! logged no-op, so implementations are free to surface plugin errors
//! directly.

use serde_json::Value as JsonValue;
use types::Timestamp;

use crate::error::Result;

/// Outcome of a permission prompt, mirroring the platform permission states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Prompt,
}

/// Strength of a haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// What gets handed to the web Notification constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct WebNotification {
    pub title: String,
    pub body: String,
    /// Icon URL; the notification's image when it has one, a favicon
    /// fallback otherwise.
    pub icon: String,
    /// The notification id; replaces an earlier notification with the same
    /// tag rather than stacking.
    pub tag: String,
    pub data: JsonValue,
    /// Demand explicit dismissal instead of auto-closing.
    pub require_interaction: bool,
    /// Where a click should take the user, when anywhere.
    pub action_url: Option<String>,
}

/// What gets scheduled through the native local-notification plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalNotification {
    /// Platform notification ids are numeric; derived from the internal
    /// string id where possible.
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Sound asset name, e.g. `beep.wav`.
    pub sound: String,
    /// Carried as the notification's extra payload.
    pub extra: JsonValue,
    /// At most one image attachment.
    pub attachment_url: Option<String>,
    /// Delivery instant; `None` means immediately.
    pub at: Option<Timestamp>,
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationBridge: Send {
    /// Prompt for display permission: the web Notification permission, or
    /// the native local-notification permission.
    fn request_display_permission(&self) -> Result<PermissionStatus>;

    /// Prompt for the native push (remote message) permission.
    fn request_push_permission(&self) -> Result<PermissionStatus>;

    /// Whether display permission is currently granted, without prompting.
    fn display_permission_granted(&self) -> bool;

    /// Hook up the platform's inbound push event source (foreground
    /// delivery and tap events). Native platforms only.
    fn install_push_listeners(&self) -> Result<()>;

    /// Kick off native push registration. Resolves with the token from the
    /// platform's registration event, or `None` if the registration-error
    /// event fired instead.
    fn register_native_push(&self) -> Result<Option<String>>;

    /// Build a web push subscription for the given application server key,
    /// returning the subscription serialized as a string.
    fn subscribe_web_push(&self, application_server_key: &[u8]) -> Result<String>;

    fn show_web_notification(&self, notification: &WebNotification) -> Result<()>;

    fn schedule_local_notification(&self, notification: &LocalNotification) -> Result<()>;

    fn vibrate(&self, style: ImpactStyle) -> Result<()>;

    /// Navigate the app to the given URL.
    fn navigate(&self, url: &str) -> Result<()>;

    /// Play a sound asset (web only; native notifications carry their own
    /// sound).
    fn play_sound(&self, asset: &str) -> Result<()>;

    fn set_badge(&self, count: u32) -> Result<()>;
}
