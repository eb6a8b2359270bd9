//! Key and metadata codecs.
//!
//! A logical key fans out into one meta record plus one or more value
//! records, kept in disjoint prefix spaces:
//!
//! - meta:          `'+' key`            -> `[version, type]`
//! - string value:  `'-' key`            -> raw bytes
//! - field value:   `'-' key '|' field`  -> field value
//! - list element:  `'-' key '|' id:u32` -> node record (id 0 is the header)
//! - expiration:    `'-' "SYSExpire" '|' key` -> unix seconds, u64 BE
//!
//! All multi-byte integers are big-endian except skip-list scores, which are
//! little-endian IEEE-754 (the on-disk format predates this implementation).

use crate::storage::{Result, StorageError, ValueType};

pub const META_PREFIX: u8 = b'+';
pub const VALUE_PREFIX: u8 = b'-';
pub const SEPARATOR: u8 = b'|';
pub const META_VERSION: u8 = 0x00;

/// Reserved logical key holding the expiration side index.
pub const EXPIRE_KEY: &[u8] = b"SYSExpire";

pub fn encode_meta_key(key: &[u8]) -> Vec<u8> {
    let mut meta_key = Vec::with_capacity(1 + key.len());
    meta_key.push(META_PREFIX);
    meta_key.extend_from_slice(key);
    meta_key
}

pub fn encode_string_key(key: &[u8]) -> Vec<u8> {
    let mut value_key = Vec::with_capacity(1 + key.len());
    value_key.push(VALUE_PREFIX);
    value_key.extend_from_slice(key);
    value_key
}

pub fn encode_field_key(key: &[u8], field: &[u8]) -> Vec<u8> {
    let mut field_key = Vec::with_capacity(1 + key.len() + 1 + field.len());
    field_key.push(VALUE_PREFIX);
    field_key.extend_from_slice(key);
    field_key.push(SEPARATOR);
    field_key.extend_from_slice(field);
    field_key
}

/// Prefix covering every field record of `key`, separator included. Full
/// deletes scan this prefix rather than `'-' key`, so a key that is a byte
/// prefix of another key never has the neighbor's records swept up.
pub fn encode_field_prefix(key: &[u8]) -> Vec<u8> {
    encode_field_key(key, &[])
}

pub fn encode_list_element_key(key: &[u8], id: u32) -> Vec<u8> {
    encode_field_key(key, &id.to_be_bytes())
}

pub fn encode_expire_key(key: &[u8]) -> Vec<u8> {
    encode_field_key(EXPIRE_KEY, key)
}

/// The field name of a record keyed `'-' key '|' field`.
pub fn field_name<'a>(record_key: &'a [u8], key: &[u8]) -> &'a [u8] {
    &record_key[1 + key.len() + 1..]
}

pub fn encode_metadata(tipe: ValueType) -> Vec<u8> {
    vec![META_VERSION, tipe.tag()]
}

pub fn parse_metadata(metadata: &[u8]) -> Result<ValueType> {
    if metadata.len() < 2 || metadata[0] != META_VERSION {
        return Err(StorageError::MetaFormat);
    }
    ValueType::try_from(metadata[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_and_value_keys() {
        assert_eq!(encode_meta_key(b"foo"), b"+foo");
        assert_eq!(encode_string_key(b"foo"), b"-foo");
        assert_eq!(encode_field_key(b"foo", b"bar"), b"-foo|bar");
        assert_eq!(encode_field_prefix(b"foo"), b"-foo|");
        assert_eq!(
            encode_list_element_key(b"foo", 1),
            b"-foo|\x00\x00\x00\x01"
        );
        assert_eq!(encode_expire_key(b"foo"), b"-SYSExpire|foo");
    }

    #[test]
    fn field_name_survives_separator_in_key() {
        let record = encode_field_key(b"a|b", b"field");
        assert_eq!(field_name(&record, b"a|b"), b"field");
    }

    #[test]
    fn metadata_round_trip() {
        for tipe in [
            ValueType::String,
            ValueType::List,
            ValueType::Set,
            ValueType::SortedSet,
            ValueType::Hash,
        ] {
            let metadata = encode_metadata(tipe);
            assert_eq!(parse_metadata(&metadata).unwrap(), tipe);
        }
    }

    #[test]
    fn metadata_rejects_bad_version_and_truncation() {
        assert!(matches!(
            parse_metadata(&[0x01, 0x00]),
            Err(StorageError::MetaFormat)
        ));
        assert!(matches!(
            parse_metadata(&[0x00]),
            Err(StorageError::MetaFormat)
        ));
        assert!(matches!(
            parse_metadata(&[0x00, 0x09]),
            Err(StorageError::MetaFormat)
        ));
    }
}
