/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Constructors for well-formed notifications, one per family.
//!
//! These are pure: no validation of parameter ranges is performed, so a
//! negative amount or nonsense status produces an odd display string rather
//! than an error.
//!
//! Ids follow the `{kind}-{domainId}-{creationMillis}` scheme. Uniqueness
//! leans on timestamp granularity: two notifications built for the same
//! kind and domain id within the same millisecond collide. This is a known
//! limitation; the inbox drops the second as a duplicate.

use types::Timestamp;

use crate::internal::model::{
    DeliveryData, Notification, NotificationData, NotificationPriority, OrderStatusData,
    PaymentData, PromotionData, ReminderData,
};

fn notification_id(kind: &str, domain_id: &str, ts: Timestamp) -> String {
    format!("{}-{}-{}", kind, domain_id, ts.as_millis())
}

/// Builds an order lifecycle notification from a status keyword.
///
/// Recognized statuses (matched case-insensitively): `confirmed`,
/// `preparing`, `ready`, `out_for_delivery`, `delivered`, `cancelled`.
/// Anything else falls back to a generic "Order Update" of the
/// `order_status` type, with the raw status echoed in the body.
pub fn order_status(
    order_id: &str,
    status: &str,
    order_number: Option<&str>,
    estimated_time: Option<u32>,
    delivery_address: Option<&str>,
) -> Notification {
    let order_ref = order_number.unwrap_or(order_id);
    let data = OrderStatusData {
        order_id: order_id.to_string(),
        order_number: order_number.map(str::to_string),
        status: status.to_string(),
        estimated_time,
        delivery_address: delivery_address.map(str::to_string),
    };

    let (title, body, data) = match status.to_lowercase().as_str() {
        "confirmed" => (
            "Order Confirmed! 🎉".to_string(),
            format!(
                "Your order #{} has been confirmed and is being prepared.",
                order_ref
            ),
            NotificationData::OrderConfirmed(data),
        ),
        "preparing" => (
            "Order Being Prepared 👨‍🍳".to_string(),
            format!(
                "Your order #{} is being prepared with fresh ingredients.",
                order_ref
            ),
            NotificationData::OrderPreparing(data),
        ),
        "ready" => (
            "Order Ready! 🍽️".to_string(),
            format!("Your order #{} is ready for pickup/delivery.", order_ref),
            NotificationData::OrderReady(data),
        ),
        "out_for_delivery" => (
            "Out for Delivery 🚚".to_string(),
            format!(
                "Your order #{} is on its way! Estimated arrival: {} minutes.",
                order_ref,
                estimated_time.unwrap_or(30)
            ),
            NotificationData::OrderOutForDelivery(data),
        ),
        "delivered" => (
            "Order Delivered! 📦".to_string(),
            format!(
                "Your order #{} has been delivered. Enjoy your meal!",
                order_ref
            ),
            NotificationData::OrderDelivered(data),
        ),
        "cancelled" => (
            "Order Cancelled".to_string(),
            format!("Your order #{} has been cancelled.", order_ref),
            NotificationData::OrderCancelled(data),
        ),
        _ => (
            "Order Update".to_string(),
            format!("Your order #{} status: {}", order_ref, status),
            NotificationData::OrderStatus(data),
        ),
    };

    let lowered = status.to_lowercase();
    let priority = if lowered == "delivered" || lowered == "cancelled" {
        NotificationPriority::High
    } else {
        NotificationPriority::Medium
    };

    let now = Timestamp::now();
    Notification {
        id: notification_id("order", order_id, now),
        title,
        body,
        priority,
        timestamp: now,
        read: false,
        data,
        image_url: None,
        action_url: Some(format!("/orders/{}", order_id)),
    }
}

/// Builds a promotion notification. Empty `title`/`body` fall back to canned
/// strings (the body fallback mentions the discount when one is given).
pub fn promotion(
    promotion_id: &str,
    title: &str,
    body: &str,
    discount: Option<u32>,
    code: Option<&str>,
    valid_until: Option<Timestamp>,
) -> Notification {
    let title = if title.is_empty() {
        "Special Promotion! 🎉".to_string()
    } else {
        title.to_string()
    };
    let body = if body.is_empty() {
        match discount {
            Some(d) => format!("Get {}% off on your next order!", d),
            None => "Check out our latest offers!".to_string(),
        }
    } else {
        body.to_string()
    };

    let now = Timestamp::now();
    Notification {
        id: notification_id("promo", promotion_id, now),
        title,
        body,
        priority: NotificationPriority::Medium,
        timestamp: now,
        read: false,
        data: NotificationData::Promotion(PromotionData {
            promotion_id: promotion_id.to_string(),
            discount,
            code: code.map(str::to_string),
            valid_until,
        }),
        image_url: None,
        action_url: Some(format!("/promotions/{}", promotion_id)),
    }
}

/// Builds a generic reminder. No action URL.
pub fn reminder(
    reminder_type: &str,
    title: &str,
    body: &str,
    scheduled_time: Option<Timestamp>,
) -> Notification {
    let title = if title.is_empty() {
        "Reminder ⏰".to_string()
    } else {
        title.to_string()
    };
    let body = if body.is_empty() {
        "Don't forget to place your order!".to_string()
    } else {
        body.to_string()
    };

    let now = Timestamp::now();
    Notification {
        id: notification_id("reminder", reminder_type, now),
        title,
        body,
        priority: NotificationPriority::Low,
        timestamp: now,
        read: false,
        data: NotificationData::Reminder(ReminderData {
            reminder_type: reminder_type.to_string(),
            scheduled_time,
        }),
        image_url: None,
        action_url: None,
    }
}

/// Builds a meal reminder. Note the id carries no domain component
/// (`meal-reminder-{millis}`), so two meal reminders in the same millisecond
/// collide regardless of meal type.
pub fn meal_reminder(meal_type: &str, scheduled_time: Option<Timestamp>) -> Notification {
    let now = Timestamp::now();
    Notification {
        id: format!("meal-reminder-{}", now.as_millis()),
        title: format!("Time for {}! 🍽️", meal_type),
        body: format!("Don't forget to order your {} meal.", meal_type),
        priority: NotificationPriority::Medium,
        timestamp: now,
        read: false,
        data: NotificationData::MealReminder(ReminderData {
            reminder_type: meal_type.to_string(),
            scheduled_time,
        }),
        image_url: None,
        action_url: Some("/menu".to_string()),
    }
}

/// Builds a delivery update. Always high priority.
pub fn delivery_update(
    order_id: &str,
    delivery_person_name: Option<&str>,
    delivery_person_phone: Option<&str>,
    estimated_arrival: Option<Timestamp>,
    tracking_url: Option<&str>,
) -> Notification {
    let eta = match estimated_arrival {
        Some(at) => format!("Estimated arrival: {}", at.to_time_string()),
        None => "Your order is on the way!".to_string(),
    };
    let body = match delivery_person_name {
        Some(name) => format!("{} Delivery person: {}", eta, name),
        None => eta,
    };

    let now = Timestamp::now();
    Notification {
        id: notification_id("delivery", order_id, now),
        title: "Delivery Update 📍".to_string(),
        body,
        priority: NotificationPriority::High,
        timestamp: now,
        read: false,
        data: NotificationData::DeliveryUpdate(DeliveryData {
            order_id: order_id.to_string(),
            delivery_person_name: delivery_person_name.map(str::to_string),
            delivery_person_phone: delivery_person_phone.map(str::to_string),
            estimated_arrival,
            tracking_url: tracking_url.map(str::to_string),
        }),
        image_url: None,
        action_url: Some(
            tracking_url
                .map(str::to_string)
                .unwrap_or_else(|| format!("/orders/{}/track", order_id)),
        ),
    }
}

/// Builds a payment outcome notification: high priority on failure, medium
/// on success, with the action URL pointing back at the payment flow on
/// failure.
pub fn payment(
    order_id: &str,
    success: bool,
    amount: f64,
    transaction_id: Option<&str>,
    payment_method: Option<&str>,
) -> Notification {
    let payment_data = PaymentData {
        order_id: order_id.to_string(),
        amount,
        transaction_id: transaction_id.map(str::to_string),
        payment_method: payment_method.map(str::to_string),
    };
    let (title, body, priority, action_url, data) = if success {
        (
            "Payment Successful! 💳".to_string(),
            format!(
                "Payment of ₹{} for order #{} was successful.",
                amount, order_id
            ),
            NotificationPriority::Medium,
            format!("/orders/{}", order_id),
            NotificationData::PaymentSuccess(payment_data),
        )
    } else {
        (
            "Payment Failed ⚠️".to_string(),
            format!(
                "Payment of ₹{} for order #{} failed. Please try again.",
                amount, order_id
            ),
            NotificationPriority::High,
            format!("/orders/{}/payment", order_id),
            NotificationData::PaymentFailed(payment_data),
        )
    };

    let now = Timestamp::now();
    Notification {
        id: notification_id("payment", order_id, now),
        title,
        body,
        priority,
        timestamp: now,
        read: false,
        data,
        image_url: None,
        action_url: Some(action_url),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_order_delivered() {
        let n = order_status("ORD-1", "delivered", None, None, None);
        assert_eq!(n.title, "Order Delivered! 📦");
        assert_eq!(n.priority, NotificationPriority::High);
        assert!(!n.read);
        assert_eq!(n.action_url.as_deref(), Some("/orders/ORD-1"));
        match &n.data {
            NotificationData::OrderDelivered(d) => {
                assert_eq!(d.order_id, "ORD-1");
                assert_eq!(d.status, "delivered");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_order_number_preferred_in_body() {
        let n = order_status("ORD-1", "confirmed", Some("A42"), None, None);
        assert!(n.body.contains("#A42"));
        assert_eq!(n.priority, NotificationPriority::Medium);
    }

    #[test]
    fn test_unrecognized_status_falls_back() {
        let n = order_status("ORD-1", "frobnicate", None, None, None);
        assert_eq!(n.title, "Order Update");
        assert!(n.body.contains("frobnicate"));
        assert_eq!(n.priority, NotificationPriority::Medium);
        match &n.data {
            NotificationData::OrderStatus(d) => assert_eq!(d.status, "frobnicate"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_status_matched_case_insensitively() {
        let n = order_status("ORD-1", "DELIVERED", None, None, None);
        assert_eq!(n.title, "Order Delivered! 📦");
        assert_eq!(n.priority, NotificationPriority::High);
    }

    #[test]
    fn test_out_for_delivery_eta_defaults_to_30() {
        let n = order_status("ORD-1", "out_for_delivery", None, None, None);
        assert!(n.body.contains("Estimated arrival: 30 minutes."));
        let n = order_status("ORD-1", "out_for_delivery", None, Some(12), None);
        assert!(n.body.contains("Estimated arrival: 12 minutes."));
    }

    #[test]
    fn test_payment_failed() {
        let n = payment("ORD-9", false, 450.0, None, None);
        assert_eq!(n.title, "Payment Failed ⚠️");
        assert_eq!(n.priority, NotificationPriority::High);
        assert!(n.body.contains("₹450"));
        assert!(n.action_url.as_deref().unwrap().ends_with("/payment"));
        assert!(matches!(n.data, NotificationData::PaymentFailed(_)));
    }

    #[test]
    fn test_payment_success() {
        let n = payment("ORD-9", true, 450.0, Some("TXN-1"), Some("upi"));
        assert_eq!(n.title, "Payment Successful! 💳");
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert_eq!(n.action_url.as_deref(), Some("/orders/ORD-9"));
        match n.data {
            NotificationData::PaymentSuccess(d) => {
                assert_eq!(d.transaction_id.as_deref(), Some("TXN-1"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_promotion_fallbacks() {
        let n = promotion("SUMMER", "", "", Some(20), Some("SAVE20"), None);
        assert_eq!(n.title, "Special Promotion! 🎉");
        assert_eq!(n.body, "Get 20% off on your next order!");
        let n = promotion("SUMMER", "", "", None, None, None);
        assert_eq!(n.body, "Check out our latest offers!");
    }

    #[test]
    fn test_reminder_is_low_priority_without_action() {
        let n = reminder("lunch", "", "", None);
        assert_eq!(n.priority, NotificationPriority::Low);
        assert_eq!(n.action_url, None);
        assert_eq!(n.title, "Reminder ⏰");
    }

    #[test]
    fn test_meal_reminder() {
        let n = meal_reminder("lunch", None);
        assert_eq!(n.title, "Time for lunch! 🍽️");
        assert_eq!(n.action_url.as_deref(), Some("/menu"));
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert!(n.id.starts_with("meal-reminder-"));
    }

    #[test]
    fn test_delivery_update_always_high() {
        let n = delivery_update("ORD-1", Some("Asha"), None, None, None);
        assert_eq!(n.priority, NotificationPriority::High);
        assert!(n.body.contains("Delivery person: Asha"));
        assert_eq!(n.action_url.as_deref(), Some("/orders/ORD-1/track"));
        let n = delivery_update("ORD-1", None, None, None, Some("https://t.example/x"));
        assert_eq!(n.action_url.as_deref(), Some("https://t.example/x"));
    }

    // Known limitation, not asserted as correct: ids are derived purely from
    // kind, domain id and millisecond timestamp, so same-tick creation
    // collides.
    #[test]
    fn test_same_tick_ids_collide() {
        let ts = Timestamp(1_725_100_200_250);
        assert_eq!(
            notification_id("order", "ORD-1", ts),
            notification_id("order", "ORD-1", ts)
        );
        assert_eq!(notification_id("order", "ORD-1", ts), "order-ORD-1-1725100200250");
    }
}
