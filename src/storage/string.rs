//! String store: one meta record plus one raw value record.

use crate::storage::keys::{encode_meta_key, encode_metadata, encode_string_key, parse_metadata};
use crate::storage::{Database, Result, ValueType};

impl Database {
    /// Writes meta + value in one batch. A key currently holding another type
    /// is removed first with the same type-dispatched delete DEL uses.
    /// Expiration is left alone; callers clear it when their semantics say so.
    pub fn put_string(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let meta_key = encode_meta_key(key);

        if let Some(metadata) = self.backend().get(&meta_key)? {
            let tipe = parse_metadata(&metadata)?;
            if tipe != ValueType::String {
                self.delete(key, tipe)?;
            }
        }

        let mut batch = sled::Batch::default();
        batch.insert(meta_key, encode_metadata(ValueType::String));
        batch.insert(encode_string_key(key), value);
        self.backend().write_batch(batch)
    }

    /// Empty bytes when the key is absent.
    pub fn get_string(&self, key: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .backend()
            .get(&encode_string_key(key))?
            .unwrap_or_default())
    }

    pub fn delete_string(&self, key: &[u8]) -> Result<()> {
        self.backend()
            .delete(&[encode_meta_key(key), encode_string_key(key)])
    }
}
