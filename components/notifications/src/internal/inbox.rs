/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The retained notification list.
//!
//! Holds the newest-first list of notifications backing the app's
//! notification center, and keeps the persisted snapshot in sync with it.
//! Every mutation that actually changes the list rewrites the snapshot;
//! no-op mutations (duplicate add, re-reading a read notification) leave
//! storage untouched.

use crate::error::Result;
use crate::internal::model::Notification;
use crate::internal::storage::{deserialize_snapshot, serialize_snapshot, Storage};

/// Oldest notifications beyond this count are evicted.
pub const MAX_NOTIFICATIONS: usize = 100;

pub struct Inbox<S> {
    store: S,
    notifications: Vec<Notification>,
}

impl<S: Storage> Inbox<S> {
    /// Hydrate the inbox from the persisted snapshot. A missing or corrupt
    /// snapshot yields an empty inbox; corruption is logged, not fatal.
    pub fn load(store: S) -> Self {
        let notifications = match store.get_snapshot() {
            Ok(Some(raw)) => match deserialize_snapshot(&raw) {
                Ok(list) => list,
                Err(e) => {
                    log::error!("Error loading notifications from storage: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Error loading notifications from storage: {}", e);
                Vec::new()
            }
        };
        Self {
            store,
            notifications,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Prepend a notification. Adding an id that's already retained is a
    /// no-op, so redelivered pushes don't duplicate.
    pub fn add(&mut self, notification: Notification) -> Result<()> {
        if self.notifications.iter().any(|n| n.id == notification.id) {
            log::debug!("Ignoring duplicate notification '{}'", notification.id);
            return Ok(());
        }
        self.notifications.insert(0, notification);
        self.notifications.truncate(MAX_NOTIFICATIONS);
        self.persist()
    }

    pub fn mark_as_read(&mut self, id: &str) -> Result<()> {
        match self
            .notifications
            .iter_mut()
            .find(|n| n.id == id && !n.read)
        {
            Some(n) => {
                n.read = true;
                self.persist()
            }
            None => Ok(()),
        }
    }

    pub fn mark_all_as_read(&mut self) -> Result<()> {
        let mut changed = false;
        for n in self.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed = true;
        }
        if changed {
            self.persist()
        } else {
            Ok(())
        }
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() != before {
            self.persist()
        } else {
            Ok(())
        }
    }

    /// Drop everything, including the persisted snapshot itself.
    pub fn clear(&mut self) -> Result<()> {
        self.notifications.clear();
        self.store.delete_snapshot()
    }

    fn persist(&self) -> Result<()> {
        let raw = serialize_snapshot(&self.notifications)?;
        self.store.set_snapshot(&raw)
    }
}
