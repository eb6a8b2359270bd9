use std::path::Path;

use serde::Deserialize;

use crate::storage::{Result, StorageError};

/// Tuning options passed through from the `[LevelDB]` section of the config
/// file. Unknown keys are ignored so existing config files keep working.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendOptions {
    #[serde(rename = "BlockCacheCapacity", default)]
    pub block_cache_capacity: Option<u64>,
    #[serde(rename = "Compression", default)]
    pub compression: Option<bool>,
}

/// Thin adapter over the embedded ordered store. Everything above this module
/// speaks in raw byte keys and values; everything below is sled.
pub struct Backend {
    db: sled::Db,
}

impl Backend {
    pub fn open(path: &Path, options: &BackendOptions) -> Result<Backend> {
        let mut config = sled::Config::new().path(path);
        if let Some(capacity) = options.block_cache_capacity {
            config = config.cache_capacity(capacity);
        }
        if let Some(compression) = options.compression {
            config = config.use_compression(compression);
        }
        Ok(Backend { db: config.open()? })
    }

    #[cfg(test)]
    pub(crate) fn temporary() -> Backend {
        let config = sled::Config::new().temporary(true);
        Backend {
            db: config.open().unwrap(),
        }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    pub fn write_batch(&self, batch: sled::Batch) -> Result<()> {
        self.db.apply_batch(batch)?;
        Ok(())
    }

    pub fn delete(&self, keys: &[Vec<u8>]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(key.as_slice());
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    /// Keys under `prefix`, in lexicographic order.
    pub fn scan_prefix<'a>(
        &'a self,
        prefix: &[u8],
    ) -> impl Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + 'a {
        self.db.scan_prefix(prefix).map(|entry| {
            let (key, value) = entry.map_err(StorageError::from)?;
            Ok((key.to_vec(), value.to_vec()))
        })
    }

    /// Every record in the store, in lexicographic order.
    pub fn scan_all(&self) -> impl Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + '_ {
        self.scan_prefix(&[])
    }

    pub fn close(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
