use web_sys::{Storage as WebStorage, window};

use crate::storage::Storage;

/// `window.localStorage` behind the game's `Storage` seam. Quota / privacy
/// errors on write are logged and dropped.
pub struct LocalStorage {
    inner: WebStorage,
}

impl LocalStorage {
    /// `None` when there is no window or the browser denies storage access.
    pub fn open() -> Option<Self> {
        let inner = window()?.local_storage().ok()??;
        Some(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        if let Err(err) = self.inner.set_item(key, value) {
            log::warn!("localStorage write failed for {key}: {err:?}");
        }
    }
}
