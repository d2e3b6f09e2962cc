use crate::error::StoreError;
use crate::{LinkGraph, VocabularyIndex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Session metadata written alongside the binary stores.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u64,
    pub num_terms: u64,
    pub created_at: String,
    pub version: u32,
}

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn vocabulary(&self) -> PathBuf { self.root.join("vocabulary.bin") }
    fn link_graph(&self) -> PathBuf { self.root.join("linkgraph.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io { path: path.to_path_buf(), source }
}

/// Loads a bincode store. An absent file yields the empty value; a file
/// that exists but fails to deserialize is reported as `Corrupt`, never
/// silently replaced by the empty value.
fn load_store<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "store absent, starting empty");
            return Ok(T::default());
        }
        Err(e) => return Err(io_err(path, e)),
    };
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| io_err(path, e))?;
    bincode::deserialize(&buf)
        .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
}

/// Saves a bincode store via a temp-file rename so the previous store
/// stays intact if the write fails part-way.
fn save_store<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let bytes = bincode::serialize(value)
        .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })?;
    let tmp = path.with_extension("bin.tmp");
    let mut f = File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
    f.write_all(&bytes).map_err(|e| io_err(&tmp, e))?;
    rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

pub fn load_vocabulary(paths: &StorePaths) -> Result<VocabularyIndex, StoreError> {
    load_store(&paths.vocabulary())
}

pub fn save_vocabulary(paths: &StorePaths, index: &VocabularyIndex) -> Result<(), StoreError> {
    save_store(&paths.vocabulary(), index)
}

pub fn load_link_graph(paths: &StorePaths) -> Result<LinkGraph, StoreError> {
    load_store(&paths.link_graph())
}

pub fn save_link_graph(paths: &StorePaths, graph: &LinkGraph) -> Result<(), StoreError> {
    save_store(&paths.link_graph(), graph)
}

pub fn save_meta(paths: &StorePaths, meta: &MetaFile) -> Result<(), StoreError> {
    let path = paths.meta();
    create_dir_all(&paths.root).map_err(|e| io_err(&paths.root, e))?;
    let json = serde_json::to_string_pretty(meta)?;
    let mut f = File::create(&path).map_err(|e| io_err(&path, e))?;
    f.write_all(json.as_bytes()).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Meta is informational; absent or unreadable meta is reported as `None`
/// rather than failing the session.
pub fn load_meta(paths: &StorePaths) -> Option<MetaFile> {
    let mut buf = String::new();
    File::open(paths.meta()).ok()?.read_to_string(&mut buf).ok()?;
    serde_json::from_str(&buf).ok()
}
