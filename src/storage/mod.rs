pub mod backend;
pub mod expire;
pub mod hash;
pub mod keys;
pub mod list;
pub mod skiplist;
pub mod string;

use std::path::Path;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error as ThisError;

use crate::storage::backend::{Backend, BackendOptions};
use crate::storage::keys::{encode_meta_key, parse_metadata};

pub const DATABASE_COUNT: usize = 16;

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("meta data format is wrong")]
    MetaFormat,
    #[error("index out of range")]
    IndexOutOfRange,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// On-disk type tag of a logical key, the second byte of its meta record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    List,
    Set,
    SortedSet,
    Hash,
}

impl ValueType {
    pub fn tag(self) -> u8 {
        match self {
            ValueType::String => 0,
            ValueType::List => 1,
            ValueType::Set => 2,
            ValueType::SortedSet => 3,
            ValueType::Hash => 4,
        }
    }

    /// The name TYPE replies with.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::SortedSet => "zset",
            ValueType::Hash => "hash",
        }
    }
}

impl TryFrom<u8> for ValueType {
    type Error = StorageError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ValueType::String),
            1 => Ok(ValueType::List),
            2 => Ok(ValueType::Set),
            3 => Ok(ValueType::SortedSet),
            4 => Ok(ValueType::Hash),
            _ => Err(StorageError::MetaFormat),
        }
    }
}

/// One logical database: a backend store plus the reader/writer lock every
/// command handler takes for its full duration.
pub struct Database {
    backend: Backend,
    lock: RwLock<()>,
}

impl Database {
    fn new(backend: Backend) -> Database {
        Database {
            backend,
            lock: RwLock::new(()),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }

    pub(crate) fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Central existence check. Looks up the meta record, and reclaims the
    /// key in place when its expiration lies in the past (lazy expiry).
    pub fn has(&self, key: &[u8]) -> Result<Option<ValueType>> {
        let metadata = match self.backend.get(&encode_meta_key(key))? {
            Some(metadata) => metadata,
            None => return Ok(None),
        };
        let tipe = parse_metadata(&metadata)?;

        if let Some(at) = self.get_expire_at(key)? {
            if expire::is_past(at) {
                self.delete(key, tipe)?;
                return Ok(None);
            }
        }
        Ok(Some(tipe))
    }

    /// Type-dispatched delete, shared by DEL, lazy expiry and type
    /// transitions. Also drops the expiration record so a later write to the
    /// same key does not inherit a dead deadline.
    pub fn delete(&self, key: &[u8], tipe: ValueType) -> Result<()> {
        match tipe {
            ValueType::String => self.delete_string(key)?,
            ValueType::Hash | ValueType::Set => self.delete_hash(key)?,
            ValueType::List => self.delete_list(key)?,
            ValueType::SortedSet => self.delete_skip(key)?,
        }
        self.clear_expire_at(key)
    }

    /// Deletes every record, one iterator pass. No backend-level drop.
    pub fn flush(&self) -> Result<()> {
        let mut keys = Vec::new();
        for entry in self.backend.scan_all() {
            let (key, _) = entry?;
            keys.push(key);
        }
        self.backend.delete(&keys)
    }
}

/// The fixed set of 16 databases, opened under `basePath/0` .. `basePath/15`
/// and passed explicitly to every connection.
pub struct Databases {
    databases: Vec<Database>,
}

impl Databases {
    pub fn open(base_path: &Path, options: &BackendOptions) -> Result<Databases> {
        let mut databases = Vec::with_capacity(DATABASE_COUNT);
        for i in 0..DATABASE_COUNT {
            let backend = Backend::open(&base_path.join(i.to_string()), options)?;
            databases.push(Database::new(backend));
        }
        Ok(Databases { databases })
    }

    #[cfg(test)]
    pub(crate) fn temporary() -> Databases {
        let databases = (0..DATABASE_COUNT)
            .map(|_| Database::new(Backend::temporary()))
            .collect();
        Databases { databases }
    }

    pub fn select(&self, index: usize) -> &Database {
        &self.databases[index]
    }

    pub fn close(&self) -> Result<()> {
        for database in &self.databases {
            database.backend.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_database() -> Database {
    Database::new(Backend::temporary())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_reports_absent_key() {
        let db = test_database();
        assert_eq!(db.has(b"missing").unwrap(), None);
    }

    #[test]
    fn has_reports_type_tag() {
        let db = test_database();
        db.put_string(b"k", b"v").unwrap();
        assert_eq!(db.has(b"k").unwrap(), Some(ValueType::String));
    }

    #[test]
    fn expired_key_is_reclaimed_on_access() {
        let db = test_database();
        db.put_string(b"k", b"v").unwrap();
        db.set_expire_at(b"k", expire::now_unix_seconds() - 10)
            .unwrap();

        assert_eq!(db.has(b"k").unwrap(), None);
        // Records are gone, not just hidden.
        assert!(db.backend.get(&encode_meta_key(b"k")).unwrap().is_none());
        assert_eq!(db.get_expire_at(b"k").unwrap(), None);
    }

    #[test]
    fn delete_dispatches_on_type() {
        let db = test_database();
        db.put_string(b"s", b"v").unwrap();
        db.push_list_tail(b"l", ValueType::List, b"a").unwrap();

        db.delete(b"s", ValueType::String).unwrap();
        db.delete(b"l", ValueType::List).unwrap();

        assert_eq!(db.has(b"s").unwrap(), None);
        assert_eq!(db.has(b"l").unwrap(), None);
        assert_eq!(db.get_list_length(b"l").unwrap(), 0);
    }

    #[test]
    fn flush_removes_every_record() {
        let db = test_database();
        db.put_string(b"a", b"1").unwrap();
        db.push_list_tail(b"b", ValueType::List, b"x").unwrap();
        db.flush().unwrap();

        assert_eq!(db.has(b"a").unwrap(), None);
        assert_eq!(db.has(b"b").unwrap(), None);
        assert_eq!(db.backend.scan_all().count(), 0);
    }
}
