use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable client-side key-value storage.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> std::io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;
    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// Key-value pairs persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> std::io::Result<HashMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(&self.path, bytes)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Non-durable storage, for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "storage lock poisoned"))
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("storage.json");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("token").unwrap(), None);

        storage.set("token", "abc").unwrap();
        storage.set("theme", "dark").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));

        reopened.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, b"not json").unwrap();

        let err = FileStorage::new(&path).get("token").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        storage.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }
}
