//! localStorage backend.
//! Persistent across page reloads and shared by every tab of the origin.

use web_sys::Storage;
use smartbot_core::ports::KeyValuePort;
use smartbot_types::{Result, SmartBotError};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's localStorage; fails in private modes that block it.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| SmartBotError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| SmartBotError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| SmartBotError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValuePort for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| SmartBotError::Storage(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SmartBotError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| SmartBotError::Storage(format!("{:?}", e)))
    }

    fn backend_name(&self) -> &str {
        "localStorage"
    }
}
