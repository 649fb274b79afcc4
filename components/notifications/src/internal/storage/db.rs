/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{ops::Deref, path::Path};

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::error::{NotificationError, Result};

use super::{schema, SNAPSHOT_KEY};

pub trait Storage: Sized {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    // The snapshot is the one key the inbox cares about, so it gets
    // dedicated helpers.
    fn get_snapshot(&self) -> Result<Option<String>>;
    fn set_snapshot(&self, raw: &str) -> Result<()>;
    fn delete_snapshot(&self) -> Result<()>;

    // And general purpose meta for anything else.
    fn get_meta(&self, key: &str) -> Result<Option<String>>;
    fn set_meta(&self, key: &str, value: &str) -> Result<()>;
    fn delete_meta(&self, key: &str) -> Result<()>;
}

pub struct NotificationDb {
    pub db: Connection,
}

impl NotificationDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        // By default, file open errors are StorageSqlErrors and aren't super
        // helpful. Instead, remap to StorageError and provide the path to the
        // file that couldn't be opened.
        let db = Connection::open_with_flags(path, flags).map_err(|orig| {
            NotificationError::StorageError(format!(
                "Could not open database file {:?} - {}",
                &path.as_os_str(),
                orig,
            ))
        })?;
        schema::init(&db)?;
        Ok(Self { db })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        schema::init(&db)?;
        Ok(Self { db })
    }
}

impl Deref for NotificationDb {
    type Target = Connection;
    fn deref(&self) -> &Connection {
        &self.db
    }
}

impl Storage for NotificationDb {
    #[cfg(not(test))]
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        NotificationDb::open(path)
    }

    #[cfg(test)]
    fn open<P: AsRef<Path>>(_path: P) -> Result<Self> {
        Self::open_in_memory()
    }

    fn get_snapshot(&self) -> Result<Option<String>> {
        self.get_meta(SNAPSHOT_KEY)
    }

    fn set_snapshot(&self, raw: &str) -> Result<()> {
        self.set_meta(SNAPSHOT_KEY, raw)
    }

    fn delete_snapshot(&self) -> Result<()> {
        self.delete_meta(SNAPSHOT_KEY)
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let result = self
            .db
            .query_row(
                "SELECT value FROM meta_data WHERE key = :key",
                &[(":key", key)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO meta_data (key, value) VALUES (:key, :value)",
            &[(":key", key), (":value", value)],
        )?;
        Ok(())
    }

    fn delete_meta(&self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM meta_data WHERE key = :key", &[(":key", key)])?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_meta_roundtrip() -> Result<()> {
        let db = NotificationDb::open_in_memory()?;
        assert_eq!(db.get_meta("app_version")?, None);
        db.set_meta("app_version", "1.0.0")?;
        assert_eq!(db.get_meta("app_version")?, Some("1.0.0".to_string()));
        db.set_meta("app_version", "1.1.0")?;
        assert_eq!(db.get_meta("app_version")?, Some("1.1.0".to_string()));
        db.delete_meta("app_version")?;
        assert_eq!(db.get_meta("app_version")?, None);
        Ok(())
    }

    #[test]
    fn test_snapshot_helpers_use_fixed_key() -> Result<()> {
        let db = NotificationDb::open_in_memory()?;
        assert_eq!(db.get_snapshot()?, None);
        db.set_snapshot("[]")?;
        assert_eq!(db.get_meta(SNAPSHOT_KEY)?, Some("[]".to_string()));
        db.delete_snapshot()?;
        assert_eq!(db.get_snapshot()?, None);
        Ok(())
    }

    #[test]
    fn test_delete_missing_snapshot_is_a_noop() -> Result<()> {
        let db = NotificationDb::open_in_memory()?;
        db.delete_snapshot()?;
        Ok(())
    }

    #[test]
    fn test_snapshot_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir().expect("creating temp dir");
        let path = dir.path().join("notifications.sqlite");
        {
            let db = NotificationDb::open(&path)?;
            db.set_snapshot("[\"snapshot\"]")?;
        }
        let db = NotificationDb::open(&path)?;
        assert_eq!(db.get_snapshot()?, Some("[\"snapshot\"]".to_string()));
        Ok(())
    }
}
