/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![allow(unknown_lints)]
#![warn(rust_2018_idioms)]
//! # Notifications Component
//!
//! This component implements the client-side notification pipeline for the
//! Plattr food-ordering app: building notifications for app events,
//! acquiring platform permissions and push registrations, displaying
//! notifications through the host platform, and retaining a capped,
//! persisted inbox backing the in-app notification center.
//!
//! ## Background Concepts
//!
//! ### One model, many sources
//!
//! Notifications enter the pipeline from three places: the [`factory`]
//! constructors (app events like an order changing status), inbound push
//! payloads handed over by the platform push plugin, and local scheduling.
//! All of them produce the same [`Notification`] value, whose `type`
//! discriminant and typed payload travel together in [`NotificationData`].
//!
//! ### The platform bridge
//!
//! The component itself is platform neutral. Everything that touches the
//! host (permission prompts, OS notification display, push registration,
//! haptics, navigation, sound, badging) goes through the
//! [`NotificationBridge`] trait, which the embedding application implements
//! for its platform. The configured [`Platform`] decides which side of each
//! web-vs-native branch is taken; it is fixed for the process lifetime.
//!
//! ### The inbox
//!
//! Delivered notifications are retained newest-first, capped at 100, and
//! mirrored to local storage as a single JSON snapshot after every change.
//! The inbox is hydrated from that snapshot at startup, so the notification
//! center survives restarts. Consumers wanting live updates register a
//! subscriber callback; the inbox itself is just another subscriber.
//!
//! ## Initialization
//!
//! Calls are handled by the [`NotificationManager`], which provides a handle
//! for future calls. It is constructed from a [`NotificationConfiguration`]
//! and a boxed [`NotificationBridge`]; construction opens the database and
//! hydrates the inbox, `initialize` then hooks up the platform push
//! listeners. `handle_push_received` and `handle_push_action` are the
//! entry points the application forwards platform push events into.

// All implementation detail lives in the `internal` module
mod internal;
use std::sync::{Arc, Mutex, MutexGuard};

mod error;

pub use error::{ApiResult, NotificationApiError, NotificationError};
pub use internal::bridge::{
    ImpactStyle, LocalNotification, NotificationBridge, PermissionStatus, WebNotification,
};
pub use internal::config::{NotificationConfiguration, Platform, Protocol};
pub use internal::factory;
pub use internal::manager::{PushPayload, SubscriberCallback};
pub use internal::model::{
    DeliveryData, Notification, NotificationData, NotificationPreferences, NotificationPriority,
    OrderStatusData, PaymentData, PromotionData, ReminderData,
};
pub use types::Timestamp;

use internal::communications::ConnectHttp;
use internal::inbox::Inbox;
use internal::storage::{Storage, Store};

/// The subscriber id the built-in inbox registers under. Subscribing again
/// with this id detaches the inbox.
pub const INBOX_SUBSCRIBER_ID: &str = "inbox";

/// Object representing the NotificationManager used to manage the
/// notification pipeline
///
/// The `NotificationManager` object is the main interface provided by this
/// crate. It exposes methods for the permission and registration flows,
/// displays and fans out notifications, and manages the persisted inbox
/// backing the app's notification center.
pub struct NotificationManager {
    // We serialize all access on a mutex for thread safety
    internal: Mutex<internal::manager::NotificationManager<ConnectHttp>>,
    inbox: Arc<Mutex<Inbox<Store>>>,
}

impl NotificationManager {
    /// Creates a new [`NotificationManager`], hydrating the inbox from the
    /// persisted snapshot at `database_path`.
    ///
    /// # Arguments
    ///   - `config`: [`NotificationConfiguration`] for this instance
    ///   - `bridge`: the platform implementation of [`NotificationBridge`]
    ///
    /// # Errors
    /// Returns an error if the database at `database_path` can't be opened.
    pub fn new(
        config: NotificationConfiguration,
        bridge: Box<dyn NotificationBridge>,
    ) -> ApiResult<Self> {
        log::debug!(
            "NotificationManager platform: {}, server_host: {}",
            config.platform,
            config.server_host
        );
        let store = Store::open(&config.database_path)?;
        let inbox = Arc::new(Mutex::new(Inbox::load(store)));
        let mut manager = internal::manager::NotificationManager::new(config, bridge);
        let inbox_sink = Arc::clone(&inbox);
        manager.subscribe(
            INBOX_SUBSCRIBER_ID,
            Box::new(move |notification| {
                let mut inbox = match inbox_sink.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Err(e) = inbox.add(notification.clone()) {
                    log::error!("Failed to retain delivered notification: {}", e);
                }
            }),
        );
        Ok(Self {
            internal: Mutex::new(manager),
            inbox,
        })
    }

    fn inbox(&self) -> MutexGuard<'_, Inbox<Store>> {
        // A subscriber panic during fan-out poisons this lock without
        // leaving the inbox inconsistent, so recover rather than propagate.
        match self.inbox.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Hooks up the platform push listeners. Idempotent; safe to call on
    /// every app start.
    pub fn initialize(&self) {
        self.internal.lock().unwrap().initialize()
    }

    /// Runs the platform permission prompt(s).
    ///
    /// On web this prompts for display permission; on native platforms it
    /// prompts for both the display and push permissions and, when both are
    /// granted, kicks off push registration as a side effect.
    ///
    /// # Returns
    /// A [`PermissionResponse`] with the overall outcome and the platform
    /// it was decided on.
    pub fn request_permissions(&self) -> PermissionResponse {
        self.internal.lock().unwrap().request_permissions()
    }

    /// Acquires a push registration.
    ///
    /// # Returns
    /// On web, the serialized push subscription built from the configured
    /// VAPID key; on native platforms, the platform registration token,
    /// which is also retained and announced to the backend. `None` if
    /// registration failed; the failure is logged.
    pub fn register_push_notifications(&self) -> Option<String> {
        self.internal.lock().unwrap().register_push_notifications()
    }

    /// The retained native push registration token, if one was acquired
    /// this process lifetime.
    pub fn push_token(&self) -> Option<String> {
        self.internal
            .lock()
            .unwrap()
            .push_token()
            .map(str::to_string)
    }

    /// Displays a notification through the platform without fanning it out
    /// to subscribers. Display failures are logged, not returned.
    pub fn show_notification(&self, notification: &Notification) {
        self.internal.lock().unwrap().show_notification(notification)
    }

    /// Displays a notification and fans it out to subscribers; the path for
    /// app-originated notifications. The built-in inbox subscriber retains
    /// it, so this is also how a notification lands in the notification
    /// center.
    pub fn send_notification(&self, notification: &Notification) {
        self.internal.lock().unwrap().send_notification(notification)
    }

    /// Registers a subscriber to be invoked for every delivered
    /// notification. A second subscription under the same id replaces the
    /// first. A subscriber that panics is logged and skipped; it can't
    /// starve the others.
    pub fn subscribe(&self, id: &str, callback: SubscriberCallback) {
        self.internal.lock().unwrap().subscribe(id, callback)
    }

    /// Removes a subscriber. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: &str) {
        self.internal.lock().unwrap().unsubscribe(id)
    }

    /// Handles a push payload delivered while the app is in the foreground:
    /// parses it (applying fallbacks for missing fields), displays it, and
    /// fans it out. A payload that can't be parsed is logged and dropped.
    pub fn handle_push_received(&self, payload: &PushPayload) {
        self.internal.lock().unwrap().handle_push_received(payload)
    }

    /// Handles the user tapping a pushed notification by navigating to its
    /// action URL, when it has one.
    pub fn handle_push_action(&self, payload: &PushPayload) {
        self.internal.lock().unwrap().handle_push_action(payload)
    }

    /// Schedules a bare local notification through the platform scheduler.
    /// `at: None` schedules it one second out.
    pub fn schedule_local_notification(&self, title: &str, body: &str, at: Option<Timestamp>) {
        self.internal
            .lock()
            .unwrap()
            .schedule_local_notification(title, body, at)
    }

    /// Plays the notification sound, when sounds are enabled. Web only.
    pub fn play_notification_sound(&self) {
        self.internal.lock().unwrap().play_notification_sound()
    }

    /// Sets the app badge count. Native only.
    pub fn set_badge(&self, count: u32) {
        self.internal.lock().unwrap().set_badge(count)
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.internal.lock().unwrap().preferences()
    }

    pub fn set_preferences(&self, preferences: NotificationPreferences) {
        self.internal.lock().unwrap().set_preferences(preferences)
    }

    /// The retained notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inbox().notifications().to_vec()
    }

    /// How many retained notifications are unread.
    pub fn unread_count(&self) -> u32 {
        self.inbox().unread_count() as u32
    }

    /// Retains a notification directly, without displaying it. Adding an id
    /// that's already retained is a no-op.
    ///
    /// # Errors
    /// Returns an error if the persisted snapshot can't be written.
    pub fn add_notification(&self, notification: Notification) -> ApiResult<()> {
        Ok(self.inbox().add(notification)?)
    }

    /// Marks one notification read. Unknown ids and already-read
    /// notifications are a no-op; read never transitions back to unread.
    ///
    /// # Errors
    /// Returns an error if the persisted snapshot can't be written.
    pub fn mark_as_read(&self, id: &str) -> ApiResult<()> {
        Ok(self.inbox().mark_as_read(id)?)
    }

    /// Marks every retained notification read.
    ///
    /// # Errors
    /// Returns an error if the persisted snapshot can't be written.
    pub fn mark_all_as_read(&self) -> ApiResult<()> {
        Ok(self.inbox().mark_all_as_read()?)
    }

    /// Removes one notification from the inbox.
    ///
    /// # Errors
    /// Returns an error if the persisted snapshot can't be written.
    pub fn remove_notification(&self, id: &str) -> ApiResult<()> {
        Ok(self.inbox().remove(id)?)
    }

    /// Removes every retained notification and deletes the persisted
    /// snapshot.
    ///
    /// # Errors
    /// Returns an error if the persisted snapshot can't be deleted.
    pub fn clear_all(&self) -> ApiResult<()> {
        Ok(self.inbox().clear()?)
    }
}

/// The outcome of [`NotificationManager::request_permissions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResponse {
    /// Whether everything the platform needs to display notifications was
    /// granted.
    pub granted: bool,
    /// The platform the decision was made on.
    pub platform: Platform,
}

#[cfg(test)]
mod test {
    use super::*;
    use internal::bridge::MockNotificationBridge;

    fn new_manager(bridge: MockNotificationBridge) -> NotificationManager {
        // The test storage backend is in-memory, so the path is unused.
        let config = NotificationConfiguration::default();
        NotificationManager::new(config, Box::new(bridge)).expect("manager should construct")
    }

    fn displayable_bridge() -> MockNotificationBridge {
        let mut bridge = MockNotificationBridge::new();
        bridge
            .expect_display_permission_granted()
            .returning(|| true);
        bridge
            .expect_show_web_notification()
            .returning(|_| Ok(()));
        bridge
    }

    #[test]
    fn test_sent_notifications_land_in_inbox() {
        let manager = new_manager(displayable_bridge());
        let n = factory::order_status("ORD-1", "confirmed", None, None, None);
        manager.send_notification(&n);
        assert_eq!(manager.notifications().len(), 1);
        assert_eq!(manager.notifications()[0].id, n.id);
        assert_eq!(manager.unread_count(), 1);
    }

    #[test]
    fn test_inbox_lifecycle_through_public_api() {
        let manager = new_manager(MockNotificationBridge::new());
        let a = factory::promotion("SUMMER", "Summer sale", "20% off", Some(20), None, None);
        let b = factory::reminder("daily", "", "", None);
        manager.add_notification(a.clone()).unwrap();
        manager.add_notification(b.clone()).unwrap();
        assert_eq!(manager.unread_count(), 2);

        manager.mark_as_read(&a.id).unwrap();
        assert_eq!(manager.unread_count(), 1);
        manager.mark_all_as_read().unwrap();
        assert_eq!(manager.unread_count(), 0);

        manager.remove_notification(&b.id).unwrap();
        assert_eq!(manager.notifications().len(), 1);
        manager.clear_all().unwrap();
        assert!(manager.notifications().is_empty());
    }

    #[test]
    fn test_duplicate_add_is_a_noop() {
        let manager = new_manager(MockNotificationBridge::new());
        let n = factory::reminder("daily", "", "", None);
        manager.add_notification(n.clone()).unwrap();
        manager.add_notification(n).unwrap();
        assert_eq!(manager.notifications().len(), 1);
    }

    #[test]
    fn test_panicking_subscriber_does_not_break_inbox_retention() {
        let manager = new_manager(displayable_bridge());
        manager.subscribe("buggy", Box::new(|_| panic!("subscriber bug")));
        let n = factory::order_status("ORD-1", "ready", None, None, None);
        manager.send_notification(&n);
        // The inbox subscriber still ran despite the panicking one.
        assert_eq!(manager.notifications().len(), 1);
    }
}
