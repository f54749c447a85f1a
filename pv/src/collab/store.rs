//! Configuration store implementations

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::ConfigStore;

/// Settings read from a dotenv-style file
///
/// The file is read on every lookup, so values written by an action (such as
/// a freshly generated key) are visible immediately.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for EnvFileStore {
    fn get(&self, key: &str) -> Option<String> {
        debug!(%key, path = %self.path.display(), "EnvFileStore::get: called");
        // from_path_iter parses without touching the process environment
        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => {
                debug!("EnvFileStore::get: env file missing");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read env file");
                return None;
            }
        };

        for entry in entries {
            match entry {
                Ok((k, v)) if k == key => return Some(v),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Failed to parse env file");
                    return None;
                }
            }
        }
        None
    }
}

/// In-memory settings, writable at runtime
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_env_file_syntax() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(
            &path,
            concat!(
                "# generated settings\n",
                "\n",
                "APP_KEY=base64:abc # generated by key:generate\n",
                "export APP_ENV=local\n",
                "NAME=\"My App\"\n",
                "SINGLE='single'\n",
                "QUOTED=\"a\\\"b\"\n",
                "EMPTY=\n",
            ),
        )
        .unwrap();
        let store = EnvFileStore::new(&path);

        assert_eq!(store.get("APP_KEY").as_deref(), Some("base64:abc"));
        assert_eq!(store.get("APP_ENV").as_deref(), Some("local"));
        assert_eq!(store.get("NAME").as_deref(), Some("My App"));
        assert_eq!(store.get("SINGLE").as_deref(), Some("single"));
        assert_eq!(store.get("QUOTED").as_deref(), Some("a\"b"));
        assert_eq!(store.get("EMPTY").as_deref(), Some(""));
        assert_eq!(store.get("MISSING"), None);
    }

    #[test]
    fn test_env_file_is_reread() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        let store = EnvFileStore::new(&path);

        assert_eq!(store.get("APP_KEY"), None);

        fs::write(&path, "APP_ENV=local\nAPP_KEY=first\n").unwrap();
        assert_eq!(store.get("APP_KEY").as_deref(), Some("first"));

        fs::write(&path, "APP_KEY=base64:second\n").unwrap();
        assert_eq!(store.get("APP_KEY").as_deref(), Some("base64:second"));
        assert_eq!(store.get("APP_ENV"), None);
    }

    #[test]
    fn test_memory_store() {
        let store: MemoryStore = [("APP_KEY", "one")].into_iter().collect();
        assert_eq!(store.get("APP_KEY").as_deref(), Some("one"));

        store.set("APP_KEY", "two");
        assert_eq!(store.get("APP_KEY").as_deref(), Some("two"));
        assert_eq!(store.get("MISSING"), None);
    }
}
