/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use rusqlite::Connection;

use crate::error::{NotificationError, Result};

const VERSION: i64 = 1;

const CREATE_TABLE_META_SQL: &str = "
CREATE TABLE IF NOT EXISTS meta_data (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
) WITHOUT ROWID;
";

/// Bring a freshly opened connection up to the current schema.
pub fn init(db: &Connection) -> Result<()> {
    let user_version: i64 = db.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version == 0 {
        create(db)?;
    } else if user_version != VERSION {
        if user_version < VERSION {
            upgrade(db, user_version)?;
        } else {
            log::warn!(
                "Loaded future schema version {}. Did you downgrade?",
                user_version
            );
        }
    }
    Ok(())
}

fn create(db: &Connection) -> Result<()> {
    db.execute_batch(CREATE_TABLE_META_SQL)?;
    db.execute_batch(&format!("PRAGMA user_version = {}", VERSION))?;
    Ok(())
}

fn upgrade(_db: &Connection, from: i64) -> Result<()> {
    // No migrations yet; version 1 is the initial schema.
    Err(NotificationError::StorageError(format!(
        "Cannot upgrade from schema version {}",
        from
    )))
}
