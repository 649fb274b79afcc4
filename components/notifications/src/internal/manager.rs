/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The notification pipeline.
//!
//! Owns the platform permission and registration flows, turns inbound push
//! payloads into [`Notification`]s, displays them through the platform
//! bridge, and fans delivered notifications out to subscribers. Display and
//! plugin failures never propagate out of here; they degrade to logged
//! no-ops so a broken plugin can't take the pipeline down with it.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use base64::{engine::general_purpose::URL_SAFE, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use types::Timestamp;

use crate::error::{NotificationError, Result};
use crate::internal::bridge::{
    ImpactStyle, LocalNotification, NotificationBridge, PermissionStatus, WebNotification,
};
use crate::internal::communications::Connection;
use crate::internal::config::{NotificationConfiguration, PLACEHOLDER_VAPID_KEY};
use crate::internal::model::{
    DeliveryData, Notification, NotificationData, NotificationPreferences, NotificationPriority,
    OrderStatusData, PaymentData, PromotionData, ReminderData,
};
use crate::PermissionResponse;

/// Title used when an inbound push carries none.
const DEFAULT_PUSH_TITLE: &str = "Plattr";

/// Icon shown for web notifications without an image of their own.
const DEFAULT_WEB_ICON: &str = "/favicon.ico";

/// Invoked once per delivered notification. Must not assume exclusive
/// ownership; the same notification is handed to every subscriber.
pub type SubscriberCallback = Box<dyn Fn(&Notification) + Send>;

/// The envelope the platform push plugin hands over for both delivery and
/// tap events. Everything is optional; the parser fills in fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    /// The `type`/`priority`/`imageUrl`/`actionUrl` discriminators plus the
    /// per-family fields, as one flat JSON object.
    #[serde(default)]
    pub data: Option<JsonValue>,
}

pub struct NotificationManager<Co> {
    config: NotificationConfiguration,
    connection: Co,
    bridge: Box<dyn NotificationBridge>,
    /// The native registration token, retained for the process lifetime
    /// once acquired. Web subscriptions are returned, not retained.
    push_token: Option<String>,
    subscribers: HashMap<String, SubscriberCallback>,
    preferences: NotificationPreferences,
    is_initialized: bool,
}

impl<Co: Connection> NotificationManager<Co> {
    pub fn new(config: NotificationConfiguration, bridge: Box<dyn NotificationBridge>) -> Self {
        Self {
            connection: Co::connect(config.clone()),
            config,
            bridge,
            push_token: None,
            subscribers: HashMap::new(),
            preferences: NotificationPreferences::default(),
            is_initialized: false,
        }
    }

    /// Hook up platform push listeners. Idempotent; later calls return
    /// immediately. On web there is nothing to install.
    pub fn initialize(&mut self) {
        if self.is_initialized {
            return;
        }
        if !self.config.platform.is_web() {
            if let Err(e) = self.bridge.install_push_listeners() {
                log::error!("Error initializing notification service: {}", e);
                return;
            }
        }
        self.is_initialized = true;
    }

    /// Run the platform permission prompt(s). When everything needed is
    /// granted on a native platform, push registration is kicked off as a
    /// side effect.
    pub fn request_permissions(&mut self) -> PermissionResponse {
        let granted = if self.config.platform.is_web() {
            match self.bridge.request_display_permission() {
                Ok(status) => status == PermissionStatus::Granted,
                Err(e) => {
                    log::error!("Error requesting notification permissions: {}", e);
                    false
                }
            }
        } else {
            let display = self.bridge.request_display_permission();
            let push = self.bridge.request_push_permission();
            match (display, push) {
                (Ok(d), Ok(p)) => {
                    d == PermissionStatus::Granted && p == PermissionStatus::Granted
                }
                (display, push) => {
                    if let Err(e) = display {
                        log::error!("Error requesting notification permissions: {}", e);
                    }
                    if let Err(e) = push {
                        log::error!("Error requesting notification permissions: {}", e);
                    }
                    false
                }
            }
        };
        if granted && !self.config.platform.is_web() {
            self.register_push_notifications();
        }
        PermissionResponse {
            granted,
            platform: self.config.platform,
        }
    }

    /// Acquire a push registration. On web this builds a push subscription
    /// from the configured VAPID key and returns it serialized; on native
    /// platforms it resolves the platform registration token, retains it,
    /// and announces it to the backend. Resolves to `None` on any failure.
    pub fn register_push_notifications(&mut self) -> Option<String> {
        if self.config.platform.is_web() {
            self.register_web_push()
        } else {
            self.register_native_push()
        }
    }

    fn register_web_push(&self) -> Option<String> {
        let key = self
            .config
            .vapid_public_key
            .as_deref()
            .unwrap_or(PLACEHOLDER_VAPID_KEY);
        let key_bytes = match decode_vapid_key(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Error registering web push: {}", e);
                return None;
            }
        };
        match self.bridge.subscribe_web_push(&key_bytes) {
            Ok(subscription) => {
                log::info!("Web push subscription created");
                Some(subscription)
            }
            Err(e) => {
                log::error!("Error registering web push: {}", e);
                None
            }
        }
    }

    fn register_native_push(&mut self) -> Option<String> {
        let token = match self.bridge.register_native_push() {
            Ok(Some(token)) => token,
            Ok(None) => {
                log::error!("Push registration error reported by platform");
                return None;
            }
            Err(e) => {
                log::error!("Error registering push notifications: {}", e);
                return None;
            }
        };
        log::info!("Push registration success");
        self.push_token = Some(token.clone());
        // Best effort; the token stays usable locally even if the backend
        // didn't take it.
        if let Err(e) =
            self.connection
                .register_token(&token, self.config.platform, &self.config.app_version)
        {
            log::error!("Failed to send token to backend: {}", e);
        }
        Some(token)
    }

    /// The retained native registration token, if any.
    pub fn push_token(&self) -> Option<&str> {
        self.push_token.as_deref()
    }

    /// Display a notification through the platform. Failures are logged and
    /// swallowed.
    pub fn show_notification(&self, notification: &Notification) {
        if self.config.platform.is_web() {
            if !self.bridge.display_permission_granted() {
                log::debug!("Skipping web notification; permission not granted");
                return;
            }
            let web = WebNotification {
                title: notification.title.clone(),
                body: notification.body.clone(),
                icon: notification
                    .image_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WEB_ICON.to_string()),
                tag: notification.id.clone(),
                data: serde_json::to_value(&notification.data).unwrap_or_default(),
                require_interaction: notification.priority == NotificationPriority::Urgent,
                action_url: notification.action_url.clone(),
            };
            if let Err(e) = self.bridge.show_web_notification(&web) {
                log::error!("Error showing notification: {}", e);
            }
        } else {
            let local = LocalNotification {
                id: numeric_notification_id(&notification.id)
                    .unwrap_or_else(|| Timestamp::now().as_millis_i64()),
                title: notification.title.clone(),
                body: notification.body.clone(),
                sound: self.config.sound_file.clone(),
                extra: serde_json::to_value(&notification.data).unwrap_or_default(),
                attachment_url: notification.image_url.clone(),
                at: None,
            };
            if let Err(e) = self.bridge.schedule_local_notification(&local) {
                log::error!("Error showing notification: {}", e);
            }
        }
    }

    /// Display a notification and fan it out to subscribers; the path for
    /// app-originated notifications.
    pub fn send_notification(&self, notification: &Notification) {
        self.show_notification(notification);
        self.notify_subscribers(notification);
    }

    /// Register a delivery subscriber. A second subscription under the same
    /// id replaces the first.
    pub fn subscribe(&mut self, id: &str, callback: SubscriberCallback) {
        self.subscribers.insert(id.to_string(), callback);
    }

    pub fn unsubscribe(&mut self, id: &str) {
        self.subscribers.remove(id);
    }

    fn notify_subscribers(&self, notification: &Notification) {
        for (id, callback) in &self.subscribers {
            // A panicking subscriber must not starve the others.
            if catch_unwind(AssertUnwindSafe(|| callback(notification))).is_err() {
                log::error!("Notification subscriber '{}' panicked", id);
            }
        }
    }

    /// Handle a push delivered while the app is in the foreground: build a
    /// notification from the payload, display it, buzz, and fan out. A
    /// payload that can't be parsed is logged and dropped.
    pub fn handle_push_received(&self, payload: &PushPayload) {
        let notification = match notification_from_push(payload) {
            Ok(n) => n,
            Err(e) => {
                log::error!("Error parsing push notification: {}", e);
                return;
            }
        };
        self.show_notification(&notification);
        if !self.config.platform.is_web() && self.preferences.vibration_enabled {
            if let Err(e) = self.bridge.vibrate(ImpactStyle::Medium) {
                log::warn!("Error triggering haptics: {}", e);
            }
        }
        self.notify_subscribers(&notification);
    }

    /// Handle the user tapping a pushed notification: navigate to its
    /// action URL, when it has one.
    pub fn handle_push_action(&self, payload: &PushPayload) {
        let notification = match notification_from_push(payload) {
            Ok(n) => n,
            Err(e) => {
                log::error!("Error parsing push notification: {}", e);
                return;
            }
        };
        if let Some(url) = &notification.action_url {
            if let Err(e) = self.bridge.navigate(url) {
                log::error!("Error handling notification action: {}", e);
            }
        }
    }

    /// Schedule a bare local notification. `at: None` means one second from
    /// now, so "immediately" still goes through the platform scheduler.
    pub fn schedule_local_notification(&self, title: &str, body: &str, at: Option<Timestamp>) {
        let now = Timestamp::now();
        let local = LocalNotification {
            id: now.as_millis_i64(),
            title: title.to_string(),
            body: body.to_string(),
            sound: self.config.sound_file.clone(),
            extra: json!({ "data": "Local notification" }),
            attachment_url: None,
            at: Some(at.unwrap_or_else(|| Timestamp(now.as_millis() + 1000))),
        };
        if let Err(e) = self.bridge.schedule_local_notification(&local) {
            log::error!("Error scheduling local notification: {}", e);
        }
    }

    /// Play the notification sound, if sounds are enabled. Web only; native
    /// notifications carry their sound with them.
    pub fn play_notification_sound(&self) {
        if !self.config.platform.is_web() || !self.preferences.sound_enabled {
            return;
        }
        let asset = format!("/{}", self.config.sound_file);
        if let Err(e) = self.bridge.play_sound(&asset) {
            log::warn!("Error playing notification sound: {}", e);
        }
    }

    /// Set the app badge count. Native only; browsers manage their own
    /// badging.
    pub fn set_badge(&self, count: u32) {
        if self.config.platform.is_web() {
            return;
        }
        if let Err(e) = self.bridge.set_badge(count) {
            log::warn!("Error setting badge count: {}", e);
        }
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences.clone()
    }

    pub fn set_preferences(&mut self, preferences: NotificationPreferences) {
        self.preferences = preferences;
    }
}

/// Decode a base64url VAPID application server key, tolerating missing
/// padding the way web push keys are usually shipped.
fn decode_vapid_key(key: &str) -> Result<Vec<u8>> {
    let padded = format!("{}{}", key, "=".repeat((4 - key.len() % 4) % 4));
    URL_SAFE
        .decode(padded)
        .map_err(|e| NotificationError::GeneralError(format!("Invalid VAPID key: {}", e)))
}

/// Platform notification ids are numeric; reuse the leading digits of the
/// internal id when it has any.
fn numeric_notification_id(id: &str) -> Option<i64> {
    let digits: &str = &id[..id.find(|c: char| !c.is_ascii_digit()).unwrap_or(id.len())];
    digits.parse().ok()
}

/// Build a [`Notification`] from an inbound push payload, applying the
/// documented fallbacks for everything the payload omits.
fn notification_from_push(payload: &PushPayload) -> Result<Notification> {
    let data_obj = payload.data.clone().unwrap_or_else(|| json!({}));
    let kind = data_obj
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or("order_status")
        .to_string();
    let priority = data_obj
        .get("priority")
        .and_then(|v| serde_json::from_value::<NotificationPriority>(v.clone()).ok())
        .unwrap_or(NotificationPriority::Medium);
    let image_url = data_obj
        .get("imageUrl")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let action_url = data_obj
        .get("actionUrl")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let data = data_from_wire(&kind, data_obj)?;
    let now = Timestamp::now();
    Ok(Notification {
        id: payload
            .id
            .clone()
            .unwrap_or_else(|| now.as_millis().to_string()),
        title: payload
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_PUSH_TITLE.to_string()),
        body: payload.body.clone().unwrap_or_default(),
        priority,
        timestamp: now,
        read: false,
        data,
        image_url,
        action_url,
    })
}

/// Map a wire `type` string plus the flat payload object onto the typed
/// union. Unknown types land in the generic order-status family.
fn data_from_wire(kind: &str, data: JsonValue) -> Result<NotificationData> {
    use serde_json::from_value;
    Ok(match kind {
        "order_confirmed" => NotificationData::OrderConfirmed(from_value::<OrderStatusData>(data)?),
        "order_preparing" => NotificationData::OrderPreparing(from_value::<OrderStatusData>(data)?),
        "order_ready" => NotificationData::OrderReady(from_value::<OrderStatusData>(data)?),
        "order_out_for_delivery" => {
            NotificationData::OrderOutForDelivery(from_value::<OrderStatusData>(data)?)
        }
        "order_delivered" => NotificationData::OrderDelivered(from_value::<OrderStatusData>(data)?),
        "order_cancelled" => NotificationData::OrderCancelled(from_value::<OrderStatusData>(data)?),
        "promotion" => NotificationData::Promotion(from_value::<PromotionData>(data)?),
        "reminder" => NotificationData::Reminder(from_value::<ReminderData>(data)?),
        "meal_reminder" => NotificationData::MealReminder(from_value::<ReminderData>(data)?),
        "delivery_update" => NotificationData::DeliveryUpdate(from_value::<DeliveryData>(data)?),
        "payment_success" => NotificationData::PaymentSuccess(from_value::<PaymentData>(data)?),
        "payment_failed" => NotificationData::PaymentFailed(from_value::<PaymentData>(data)?),
        "bulk_order_update" => {
            NotificationData::BulkOrderUpdate(from_value::<OrderStatusData>(data)?)
        }
        "catering_update" => NotificationData::CateringUpdate(from_value::<OrderStatusData>(data)?),
        // "order_status" and anything we don't recognize.
        _ => NotificationData::OrderStatus(from_value::<OrderStatusData>(data)?),
    })
}
