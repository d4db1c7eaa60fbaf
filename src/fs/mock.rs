// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(BTreeSet<String>), // child names
}

/// In-memory filesystem for unit tests.
///
/// Files can be marked read-only, in which case `remove_file` and `rename`
/// fail, to exercise the error paths of output handling.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    read_only: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir(BTreeSet::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            read_only: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.lock();
        files.insert(path.clone(), MockEntry::File(content.into()));
        link_to_parent(&mut files, &path);
    }

    pub fn set_read_only(&self, path: impl AsRef<Path>) {
        self.read_only
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.as_ref().to_path_buf());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_read_only(&self, path: &Path) -> bool {
        self.read_only
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
    }
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn link_to_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let parent = parent_of(path);
    if parent == path {
        return;
    }
    if !files.contains_key(parent) {
        files.insert(parent.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
        link_to_parent(files, parent);
    }
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        files.get_mut(parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        children.insert(name.to_string());
    }
}

fn unlink_from_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let parent = parent_of(path);
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        files.get_mut(parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        children.remove(name);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.lock();
        match files.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File(_)))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        if self.is_read_only(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let mut files = self.lock();
        match files.get(path) {
            Some(MockEntry::File(_)) => {
                files.remove(path);
                unlink_from_parent(&mut files, path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if self.is_read_only(from) {
            return Err(anyhow!("Permission denied: {:?}", from));
        }
        let mut files = self.lock();
        let entry = files
            .remove(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        unlink_from_parent(&mut files, from);
        files.insert(to.to_path_buf(), entry);
        link_to_parent(&mut files, to);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.lock();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_moves_entry_between_listings() {
        let fs = MockFileSystem::new();
        fs.add_file("./work/pwgevents.lhe", b"<LesHouchesEvents>");

        fs.rename(
            Path::new("./work/pwgevents.lhe"),
            Path::new("./work/PowhegOTF._1.events"),
        )
        .unwrap();

        assert!(!fs.exists(Path::new("./work/pwgevents.lhe")));
        assert!(fs.is_file(Path::new("./work/PowhegOTF._1.events")));
        assert_eq!(
            fs.read_dir(Path::new("./work")).unwrap(),
            vec![PathBuf::from("./work/PowhegOTF._1.events")]
        );
    }

    #[test]
    fn read_only_files_resist_removal() {
        let fs = MockFileSystem::new();
        fs.add_file("./pwgevents.lhe", b"old");
        fs.set_read_only("./pwgevents.lhe");

        assert!(fs.remove_file(Path::new("./pwgevents.lhe")).is_err());
        assert!(fs.exists(Path::new("./pwgevents.lhe")));
    }

    #[test]
    fn missing_rename_source_errors() {
        let fs = MockFileSystem::new();
        assert!(fs
            .rename(Path::new("./nothing.lhe"), Path::new("./out.events"))
            .is_err());
    }
}
