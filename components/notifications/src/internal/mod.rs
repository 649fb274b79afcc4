/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

pub mod bridge;
pub mod communications;
pub mod config;
pub mod factory;
pub mod inbox;
pub mod manager;
pub mod model;
pub mod storage;
