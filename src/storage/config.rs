use std::path::PathBuf;

/// Configuration of the embedded graph store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the sled database
    pub path: PathBuf,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Background flush interval, `None` disables periodic flushing
    pub flush_every_ms: Option<u64>,
    /// Delete the database when the handle is dropped
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("benchmark_db"),
            cache_capacity: 256 * 1024 * 1024,
            flush_every_ms: Some(500),
            temporary: false,
        }
    }
}

impl StoreConfig {
    /// A store rooted at `path` with default tuning
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        StoreConfig {
            path: path.into(),
            ..StoreConfig::default()
        }
    }

    /// A throwaway store, removed when dropped
    pub fn temporary() -> Self {
        StoreConfig {
            temporary: true,
            ..StoreConfig::default()
        }
    }

    pub(crate) fn to_sled(&self) -> sled::Config {
        let config = sled::Config::new()
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms);

        if self.temporary {
            config.temporary(true)
        } else {
            config.path(&self.path)
        }
    }
}
