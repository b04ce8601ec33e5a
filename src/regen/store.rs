use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::compose::route::RouteParams;
use crate::foundation::error::{WeftError, WeftResult};
use crate::regen::staleness::Revalidate;

/// Identity of one regenerable artifact: route plus its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    /// Create a key from a raw identity string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key from a route path and its parameters.
    pub fn for_route(path: &str, params: &RouteParams) -> Self {
        let mut out = String::from(path);
        for (i, (k, v)) in params.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        Self(out)
    }

    /// View the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication metadata stored next to each artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Milliseconds since the Unix epoch at publish time.
    #[serde(rename = "generated_at")]
    pub generated_at_ms: u64,
    /// Staleness interval the artifact was published under.
    #[serde(default)]
    pub revalidate: Revalidate,
}

impl ArtifactMetadata {
    /// Create metadata stamped at `generated_at`.
    pub fn new(generated_at: SystemTime, revalidate: Revalidate) -> Self {
        let generated_at_ms = generated_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            generated_at_ms,
            revalidate,
        }
    }

    /// Publish instant as a [`SystemTime`].
    pub fn generated_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.generated_at_ms)
    }
}

/// Persistence for published artifacts and their metadata.
///
/// Writes must be atomic: a reader racing a writer sees either the prior
/// complete value or the new one.
pub trait ContentStore: Send + Sync + 'static {
    /// Read the published artifact for `key`, if any.
    fn read_artifact(&self, key: &ContentKey) -> WeftResult<Option<Vec<u8>>>;

    /// Atomically replace the published artifact for `key`.
    fn write_artifact_atomic(&self, key: &ContentKey, bytes: &[u8]) -> WeftResult<()>;

    /// Read publication metadata for `key`, if any.
    fn read_metadata(&self, key: &ContentKey) -> WeftResult<Option<ArtifactMetadata>>;

    /// Atomically replace publication metadata for `key`.
    fn write_metadata_atomic(&self, key: &ContentKey, meta: &ArtifactMetadata) -> WeftResult<()>;
}

/// Filesystem-backed content store.
///
/// File names are xxh3 hashes of the content key. Writes go to a temporary
/// sibling, fsync, then rename over the published path; the rename is the
/// atomicity boundary.
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> WeftResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            WeftError::store(format!("create store root '{}': {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    fn stem(key: &ContentKey) -> String {
        format!("{:016x}", xxh3_64(key.as_str().as_bytes()))
    }

    fn artifact_path(&self, key: &ContentKey) -> PathBuf {
        self.root.join(format!("{}.wire", Self::stem(key)))
    }

    fn metadata_path(&self, key: &ContentKey) -> PathBuf {
        self.root.join(format!("{}.meta.json", Self::stem(key)))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> WeftResult<()> {
        let tmp = path.with_extension("tmp");
        let mut file = File::create(&tmp)
            .map_err(|e| WeftError::store(format!("create '{}': {e}", tmp.display())))?;
        file.write_all(bytes)
            .map_err(|e| WeftError::store(format!("write '{}': {e}", tmp.display())))?;
        file.sync_all()
            .map_err(|e| WeftError::store(format!("fsync '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, path).map_err(|e| {
            WeftError::store(format!(
                "rename '{}' over '{}': {e}",
                tmp.display(),
                path.display()
            ))
        })?;
        // Make the rename itself durable.
        #[cfg(unix)]
        if let Ok(dir) = File::open(&self.root) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn read_file(path: &Path) -> WeftResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WeftError::store(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }
}

impl ContentStore for FsContentStore {
    fn read_artifact(&self, key: &ContentKey) -> WeftResult<Option<Vec<u8>>> {
        Self::read_file(&self.artifact_path(key))
    }

    fn write_artifact_atomic(&self, key: &ContentKey, bytes: &[u8]) -> WeftResult<()> {
        self.write_atomic(&self.artifact_path(key), bytes)
    }

    fn read_metadata(&self, key: &ContentKey) -> WeftResult<Option<ArtifactMetadata>> {
        match Self::read_file(&self.metadata_path(key))? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| WeftError::store(format!("parse metadata for '{key}': {e}"))),
        }
    }

    fn write_metadata_atomic(&self, key: &ContentKey, meta: &ArtifactMetadata) -> WeftResult<()> {
        let bytes = serde_json::to_vec(meta)
            .map_err(|e| WeftError::store(format!("serialize metadata for '{key}': {e}")))?;
        self.write_atomic(&self.metadata_path(key), &bytes)
    }
}

#[derive(Default)]
struct MemoryEntry {
    artifact: Option<Vec<u8>>,
    metadata: Option<ArtifactMetadata>,
}

/// In-memory content store for tests and embedded use.
///
/// Each write swaps a whole value under the lock, so publication is atomic by
/// construction.
#[derive(Default)]
pub struct MemoryContentStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, MemoryEntry>) -> T) -> T {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl ContentStore for MemoryContentStore {
    fn read_artifact(&self, key: &ContentKey) -> WeftResult<Option<Vec<u8>>> {
        Ok(self.with_entries(|entries| {
            entries.get(key.as_str()).and_then(|e| e.artifact.clone())
        }))
    }

    fn write_artifact_atomic(&self, key: &ContentKey, bytes: &[u8]) -> WeftResult<()> {
        self.with_entries(|entries| {
            entries.entry(key.as_str().to_owned()).or_default().artifact = Some(bytes.to_vec());
        });
        Ok(())
    }

    fn read_metadata(&self, key: &ContentKey) -> WeftResult<Option<ArtifactMetadata>> {
        Ok(self.with_entries(|entries| {
            entries.get(key.as_str()).and_then(|e| e.metadata)
        }))
    }

    fn write_metadata_atomic(&self, key: &ContentKey, meta: &ArtifactMetadata) -> WeftResult<()> {
        self.with_entries(|entries| {
            entries.entry(key.as_str().to_owned()).or_default().metadata = Some(*meta);
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/regen/store.rs"]
mod tests;
