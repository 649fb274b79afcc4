/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod db;
mod record;
mod schema;

pub use db::{NotificationDb as Store, Storage};
pub use record::{deserialize_snapshot, serialize_snapshot};

/// The meta key the whole inbox snapshot lives under.
pub const SNAPSHOT_KEY: &str = "notifications";
