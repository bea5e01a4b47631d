use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 上傳到 API 的檔案只存在記憶體中
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, data: &[u8]) -> Self {
        let storage = Self::new();
        if let Ok(mut files) = storage.files.write() {
            files.insert(path.to_string(), data.to_vec());
        }
        storage
    }

    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(path).cloned()
    }
}

fn poisoned() -> std::io::Error {
    std::io::Error::other("memory storage lock poisoned")
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.read().map_err(|_| poisoned())?;
        let data = files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )
        })?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.write().map_err(|_| poisoned())?;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}
