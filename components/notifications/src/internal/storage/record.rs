/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The persisted snapshot format.
//!
//! The retained notifications are stored as one JSON array under a single
//! meta key, ordered newest first, each element in the same wire shape the
//! backend uses (tagged `type`, camelCase `data`, RFC 3339 timestamps).

use crate::error::Result;
use crate::internal::model::Notification;

pub fn serialize_snapshot(notifications: &[Notification]) -> Result<String> {
    Ok(serde_json::to_string(notifications)?)
}

pub fn deserialize_snapshot(raw: &str) -> Result<Vec<Notification>> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::internal::model::{NotificationData, NotificationPriority, OrderStatusData};
    use types::Timestamp;

    #[test]
    fn test_snapshot_roundtrip_preserves_order() {
        let notifications: Vec<Notification> = (0..3)
            .map(|i| Notification {
                id: format!("order-ORD-{}-1725100200250", i),
                title: "Order Confirmed! 🎉".to_string(),
                body: "on its way".to_string(),
                priority: NotificationPriority::Medium,
                timestamp: Timestamp(1_725_100_200_250 + i),
                read: i == 2,
                data: NotificationData::OrderConfirmed(OrderStatusData {
                    order_id: format!("ORD-{}", i),
                    status: "confirmed".to_string(),
                    ..Default::default()
                }),
                image_url: None,
                action_url: None,
            })
            .collect();
        let raw = serialize_snapshot(&notifications).unwrap();
        let back = deserialize_snapshot(&raw).unwrap();
        assert_eq!(back, notifications);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        assert!(deserialize_snapshot("[{\"id\": truncated").is_err());
    }
}
