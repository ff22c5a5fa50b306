//! On-disk cache of lexical indexes keyed by content hash.

use crate::config::Language;
use crate::error::StoreError;
use crate::search::{Analyzer, LexicalIndex};
use ahash::AHashSet;
use postcard::{from_io, to_io};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Hash of a version body, used as the cache key.
pub fn content_hash(content: &str) -> u64 {
    xxh3_64(content.as_bytes())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    language: Language,
    entries: HashMap<u64, LexicalIndex>,
}

/// Reuses previously built lexical indexes across corpus loads.
///
/// Indexes are only valid for the language they were built with; a cache file
/// written for another language is discarded on open.
#[derive(Debug)]
pub struct IndexCache {
    path: PathBuf,
    file: CacheFile,
    used: AHashSet<u64>,
    hits: usize,
    misses: usize,
}

impl IndexCache {
    /// Opens the cache at `path`. A missing, unreadable or foreign cache starts empty.
    pub fn open(path: impl Into<PathBuf>, language: Language) -> Self {
        let path = path.into();
        let file = match Self::read(&path) {
            Some(file) if file.language == language => {
                tracing::debug!(
                    "Loaded {} cached indexes from {}",
                    file.entries.len(),
                    path.display()
                );
                file
            }
            Some(_) => {
                tracing::info!(
                    "Discarding index cache built for another language (file: {})",
                    path.display()
                );
                CacheFile {
                    language,
                    entries: HashMap::new(),
                }
            }
            None => CacheFile {
                language,
                entries: HashMap::new(),
            },
        };

        Self {
            path,
            file,
            used: AHashSet::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn read(path: &Path) -> Option<CacheFile> {
        let mut file = File::open(path).ok()?;
        let mut buf = [0u8; 8192];
        match from_io((&mut file, &mut buf)) {
            Ok((cache, _)) => Some(cache),
            Err(e) => {
                tracing::warn!("Failed to deserialize index cache at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Returns the cached index for `content`, building and remembering it on a miss.
    pub(crate) fn get_or_build(&mut self, content: &str, analyzer: &Analyzer) -> LexicalIndex {
        let key = content_hash(content);
        self.used.insert(key);

        if let Some(index) = self.file.entries.get(&key) {
            self.hits += 1;
            return index.clone();
        }

        self.misses += 1;
        let index = LexicalIndex::build(content, analyzer);
        self.file.entries.insert(key, index.clone());
        index
    }

    /// Number of lookups served from the cache since it was opened.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Writes the cache back, keeping only entries used since it was opened.
    pub fn save(mut self) -> Result<(), StoreError> {
        let used = std::mem::take(&mut self.used);
        self.file.entries.retain(|key, _| used.contains(key));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let result = File::create(&tmp)
            .map_err(StoreError::from)
            .and_then(|file| {
                let mut writer = to_io(&self.file, BufWriter::new(file))?;
                writer.flush()?;
                Ok(())
            })
            .and_then(|()| std::fs::rename(&tmp, &self.path).map_err(StoreError::from));

        match result {
            Ok(()) => {
                tracing::debug!(
                    "Cached {} lexical indexes to {}",
                    self.file.entries.len(),
                    self.path.display()
                );
                Ok(())
            }
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                Err(e)
            }
        }
    }
}
