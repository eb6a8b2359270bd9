//! Hash/set store: one field record per entry under `'-' key '|' field`.
//!
//! Sets reuse the whole encoding with the 3-byte sentinel `set` as every
//! field value; member commands only ever look at field names.

use std::collections::HashMap;

use crate::storage::keys::{
    encode_field_key, encode_field_prefix, encode_meta_key, encode_metadata, field_name,
};
use crate::storage::{Database, Result, ValueType};

/// Value stored for every set member.
pub const SET_SENTINEL: &[u8] = b"set";

impl Database {
    /// Batch-writes meta plus one record per field. Fields already present
    /// but absent from `fields` are left untouched.
    pub fn put_hash(
        &self,
        key: &[u8],
        tipe: ValueType,
        fields: &HashMap<Vec<u8>, Vec<u8>>,
    ) -> Result<()> {
        let mut batch = sled::Batch::default();
        batch.insert(encode_meta_key(key), encode_metadata(tipe));
        for (field, value) in fields {
            batch.insert(encode_field_key(key, field), value.as_slice());
        }
        self.backend().write_batch(batch)
    }

    pub fn get_hash(&self, key: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>> {
        let mut hash = HashMap::new();
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, value) = entry?;
            hash.insert(field_name(&record_key, key).to_vec(), value);
        }
        Ok(hash)
    }

    /// Like `get_hash` but preserves backend iteration order, which is
    /// lexicographic by field.
    pub fn get_hash_as_array(&self, key: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut fields = Vec::new();
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, value) = entry?;
            fields.push((field_name(&record_key, key).to_vec(), value));
        }
        Ok(fields)
    }

    pub fn get_field_names(&self, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut names = Vec::new();
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, _) = entry?;
            names.push(field_name(&record_key, key).to_vec());
        }
        Ok(names)
    }

    /// Point-gets of the requested fields; missing fields map to `None`.
    pub fn get_fields(
        &self,
        key: &[u8],
        fields: &[Vec<u8>],
    ) -> Result<HashMap<Vec<u8>, Option<Vec<u8>>>> {
        let mut hash = HashMap::new();
        for field in fields {
            let value = self.backend().get(&encode_field_key(key, field))?;
            hash.insert(field.clone(), value);
        }
        Ok(hash)
    }

    /// Point-gets preserving request order.
    pub fn get_fields_as_array(
        &self,
        key: &[u8],
        fields: &[Vec<u8>],
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            values.push(self.backend().get(&encode_field_key(key, field))?);
        }
        Ok(values)
    }

    /// Deletes the listed field records; when no field survives, the meta
    /// record goes too.
    pub fn delete_fields(&self, key: &[u8], fields: &[Vec<u8>]) -> Result<()> {
        let keys: Vec<Vec<u8>> = fields
            .iter()
            .map(|field| encode_field_key(key, field))
            .collect();
        self.backend().delete(&keys)?;

        let mut remaining = self.backend().scan_prefix(&encode_field_prefix(key));
        if remaining.next().is_none() {
            self.backend().delete(&[encode_meta_key(key)])?;
        }
        Ok(())
    }

    pub fn delete_hash(&self, key: &[u8]) -> Result<()> {
        let mut keys = vec![encode_meta_key(key)];
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, _) = entry?;
            keys.push(record_key);
        }
        self.backend().delete(&keys)
    }
}
