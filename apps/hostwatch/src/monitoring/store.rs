use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::StoreError;

/// Persistence for the list of monitored host names
pub trait TargetStore {
    /// Read every stored line, untrimmed and unvalidated
    fn load_names(&self) -> Result<Vec<String>, StoreError>;

    /// Replace the stored list with `names`, in order
    fn save_names(&self, names: &[&str]) -> Result<(), StoreError>;
}

/// Plain text store: one name per line, no header
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetStore for FileStore {
    fn load_names(&self) -> Result<Vec<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(str::to_owned).collect()),
            // First run: nothing saved yet
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Read { path: self.path.clone(), source }),
        }
    }

    fn save_names(&self, names: &[&str]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut contents = String::new();
        for name in names {
            contents.push_str(name);
            contents.push('\n');
        }

        fs::write(&self.path, contents).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("domains.txt"));

        assert!(store.load_names().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domains.txt");
        let store = FileStore::new(&path);

        store.save_names(&["a.example", "b.example", "c.example"]).unwrap();
        store.save_names(&["b.example"]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "b.example\n");
        assert_eq!(store.load_names().unwrap(), vec!["b.example".to_string()]);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/state/domains.txt"));

        store.save_names(&["example.com"]).unwrap();

        assert_eq!(store.load_names().unwrap(), vec!["example.com".to_string()]);
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file
        let store = FileStore::new(dir.path());

        assert!(matches!(store.load_names(), Err(StoreError::Read { .. })));
    }
}
