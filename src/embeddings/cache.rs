// ============================================
// HAPPYHOUR - Embedding Cache Store
// ============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Embedding, EmbeddingError};

/// On-disk list of embeddings, positionally aligned with the parsed items.
///
/// The file is a JSON array of arrays. It carries no item metadata: entry `i`
/// belongs to item `i` of the source file.
pub struct EmbeddingCache {
    path: PathBuf,
}

impl EmbeddingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load cached embeddings. A missing file is `Ok(None)`; a file that does
    /// not parse as an array of vectors is [`EmbeddingError::CacheCorrupt`].
    pub fn load(&self) -> Result<Option<Vec<Embedding>>, EmbeddingError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(EmbeddingError::CacheRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let embeddings: Vec<Embedding> =
            serde_json::from_str(&content).map_err(|source| EmbeddingError::CacheCorrupt {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(embeddings))
    }

    /// Persist embeddings, replacing any previous cache.
    ///
    /// Writes to a sibling temp file and renames it over the target, so an
    /// interrupted write never leaves a truncated cache behind.
    pub fn save(&self, embeddings: &[Embedding]) -> Result<(), EmbeddingError> {
        self.write_atomic(embeddings)
            .map_err(|source| EmbeddingError::CacheWrite {
                path: self.path.clone(),
                source,
            })
    }

    fn write_atomic(&self, embeddings: &[Embedding]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_vec(embeddings)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
