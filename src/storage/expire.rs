//! Expiration side index.
//!
//! Deadlines live under the reserved `SYSExpire` logical key, one record per
//! expiring key, as whole unix seconds (u64 big-endian). Sub-second precision
//! handed to PEXPIRE/PEXPIREAT is truncated; the on-disk format is shared
//! with other implementations and must not change. Expiry is enforced lazily
//! by `Database::has`, never by a background scanner.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::storage::keys::encode_expire_key;
use crate::storage::{Database, Result};

impl Database {
    /// The stored deadline of `key` as unix seconds.
    pub fn get_expire_at(&self, key: &[u8]) -> Result<Option<u64>> {
        let record = match self.backend().get(&encode_expire_key(key))? {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.len() < 8 {
            return Ok(None);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&record[..8]);
        Ok(Some(u64::from_be_bytes(buf)))
    }

    /// Idempotent write of a deadline. The zero instant is a no-op.
    pub fn set_expire_at(&self, key: &[u8], at_unix_seconds: u64) -> Result<()> {
        if at_unix_seconds == 0 {
            return Ok(());
        }
        self.backend()
            .put(&encode_expire_key(key), &at_unix_seconds.to_be_bytes())
    }

    pub fn clear_expire_at(&self, key: &[u8]) -> Result<()> {
        self.backend().delete(&[encode_expire_key(key)])
    }
}

pub(crate) fn is_past(at_unix_seconds: u64) -> bool {
    (at_unix_seconds as u128) * 1000 < now_unix_millis()
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_secs())
        .unwrap_or(0)
}

pub fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_database;

    #[test]
    fn set_get_clear() {
        let db = test_database();
        db.set_expire_at(b"k", 4_000_000_000).unwrap();
        assert_eq!(db.get_expire_at(b"k").unwrap(), Some(4_000_000_000));

        db.clear_expire_at(b"k").unwrap();
        assert_eq!(db.get_expire_at(b"k").unwrap(), None);
    }

    #[test]
    fn zero_instant_is_a_noop() {
        let db = test_database();
        db.set_expire_at(b"k", 0).unwrap();
        assert_eq!(db.get_expire_at(b"k").unwrap(), None);
    }

    #[test]
    fn past_detection() {
        assert!(is_past(1));
        assert!(!is_past(now_unix_seconds() + 100));
    }
}
