/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The internal notification model.
//!
//! A [`Notification`] is the one shape every source funnels into: factory
//! constructors, inbound push payloads and app-originated synthetic events
//! all produce this type, and the inbox stores and persists it.
//!
//! The `type` discriminant and per-family payload live together in
//! [`NotificationData`], so a notification can never carry a payload that
//! disagrees with its declared type. On the wire (persisted snapshot,
//! backend payloads) it keeps the original JSON shape: a `type` string tag
//! next to a `data` object with camelCase fields.

use serde::{Deserialize, Serialize};
use types::Timestamp;

/// Advisory display priority. `Urgent` makes a displayed web notification
/// demand explicit dismissal; nothing else consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Globally unique within the inbox's retained set. Assigned at creation
    /// as `{kind}-{domainId}-{millis}`; see [`crate::factory`] for the
    /// collision caveat.
    pub id: String,

    pub title: String,

    pub body: String,

    pub priority: NotificationPriority,

    /// Creation instant. Immutable.
    pub timestamp: Timestamp,

    /// Starts false; transitions false→true only.
    pub read: bool,

    /// Type discriminant plus the variant-specific payload.
    #[serde(flatten)]
    pub data: NotificationData,

    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Drives navigation when the displayed notification is activated.
    #[serde(rename = "actionUrl", default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Notification {
    /// The wire name of this notification's type, e.g. `"order_delivered"`.
    pub fn kind(&self) -> &'static str {
        self.data.kind()
    }
}

/// The tagged union over notification kinds.
///
/// Several wire discriminants share a payload family: all the order lifecycle
/// variants carry [`OrderStatusData`], and the two payment outcomes carry
/// [`PaymentData`]. `bulk_order_update` and `catering_update` only ever
/// arrive via push; they reuse the order-status family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NotificationData {
    OrderStatus(OrderStatusData),
    OrderConfirmed(OrderStatusData),
    OrderPreparing(OrderStatusData),
    OrderReady(OrderStatusData),
    OrderOutForDelivery(OrderStatusData),
    OrderDelivered(OrderStatusData),
    OrderCancelled(OrderStatusData),
    Promotion(PromotionData),
    Reminder(ReminderData),
    MealReminder(ReminderData),
    DeliveryUpdate(DeliveryData),
    PaymentSuccess(PaymentData),
    PaymentFailed(PaymentData),
    BulkOrderUpdate(OrderStatusData),
    CateringUpdate(OrderStatusData),
}

impl NotificationData {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationData::OrderStatus(_) => "order_status",
            NotificationData::OrderConfirmed(_) => "order_confirmed",
            NotificationData::OrderPreparing(_) => "order_preparing",
            NotificationData::OrderReady(_) => "order_ready",
            NotificationData::OrderOutForDelivery(_) => "order_out_for_delivery",
            NotificationData::OrderDelivered(_) => "order_delivered",
            NotificationData::OrderCancelled(_) => "order_cancelled",
            NotificationData::Promotion(_) => "promotion",
            NotificationData::Reminder(_) => "reminder",
            NotificationData::MealReminder(_) => "meal_reminder",
            NotificationData::DeliveryUpdate(_) => "delivery_update",
            NotificationData::PaymentSuccess(_) => "payment_success",
            NotificationData::PaymentFailed(_) => "payment_failed",
            NotificationData::BulkOrderUpdate(_) => "bulk_order_update",
            NotificationData::CateringUpdate(_) => "catering_update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatusData {
    pub order_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    /// The raw status keyword as supplied by the producer; preserved even
    /// when it doesn't match any known order lifecycle step.
    pub status: String,

    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionData {
    pub promotion_id: String,

    /// Percentage off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderData {
    pub reminder_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryData {
    pub order_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_person_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_person_phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentData {
    pub order_id: String,

    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Per-user notification preferences. Defaults to everything enabled;
/// `sound_enabled` and `vibration_enabled` gate the manager's sound and
/// haptic side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub order_updates: bool,
    pub promotions: bool,
    pub reminders: bool,
    pub delivery_updates: bool,
    pub payment_updates: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            order_updates: true,
            promotions: true,
            reminders: true,
            delivery_updates: true,
            payment_updates: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn sample() -> Notification {
        Notification {
            id: "order-ORD-1-1725100200250".to_string(),
            title: "Order Delivered! 📦".to_string(),
            body: "Your order #ORD-1 has been delivered. Enjoy your meal!".to_string(),
            priority: NotificationPriority::High,
            timestamp: Timestamp(1_725_100_200_250),
            read: false,
            data: NotificationData::OrderDelivered(OrderStatusData {
                order_id: "ORD-1".to_string(),
                status: "delivered".to_string(),
                ..Default::default()
            }),
            image_url: None,
            action_url: Some("/orders/ORD-1".to_string()),
        }
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "order_delivered");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["data"]["orderId"], "ORD-1");
        assert_eq!(value["data"]["status"], "delivered");
        assert_eq!(value["timestamp"], "2024-08-31T10:30:00.250Z");
        assert_eq!(value["actionUrl"], "/orders/ORD-1");
        // absent options are omitted, not nulled
        assert!(value.get("imageUrl").is_none());
        assert!(value["data"].get("orderNumber").is_none());
    }

    #[test]
    fn test_roundtrip() {
        let n = sample();
        let json = serde_json::to_string(&n).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }

    #[test]
    fn test_deserialize_ignores_unknown_payload_fields() {
        let value = json!({
            "id": "123",
            "type": "promotion",
            "title": "t",
            "body": "b",
            "priority": "medium",
            "timestamp": "2024-08-31T10:30:00.250Z",
            "read": false,
            "data": { "promotionId": "SUMMER", "discount": 20, "campaignSource": "email" },
        });
        let n: Notification = serde_json::from_value(value).unwrap();
        match n.data {
            NotificationData::Promotion(p) => {
                assert_eq!(p.promotion_id, "SUMMER");
                assert_eq!(p.discount, Some(20));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_priority_ordering() {
        assert!(NotificationPriority::Low < NotificationPriority::Medium);
        assert!(NotificationPriority::Medium < NotificationPriority::High);
        assert!(NotificationPriority::High < NotificationPriority::Urgent);
    }

    #[test]
    fn test_kind_matches_tag() {
        let n = sample();
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], n.kind());
    }
}
