use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use thiserror::Error;

use crate::models::Snippet;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot parse snippet file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid snippet id {id} in {path:?}: {reason}")]
    InvalidId {
        path: PathBuf,
        id: u64,
        reason: &'static str,
    },
    #[error("cannot serialize snippets: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no snippet ids left to assign")]
    IdsExhausted,
}

/// How hard a persist tries to reach stable storage before returning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteDurability {
    #[default]
    Fast,
    /// fsync the temp file and its directory around the rename.
    Durable,
}

/// Owns the snippet collection and mirrors it to a single JSON file.
///
/// Every mutation rewrites the whole file through a temp file and a rename while holding
/// the writer lock, so there is exactly one writer at a time. The collection lock is only
/// held to snapshot or update memory, never across file I/O.
#[derive(Debug)]
pub struct SnippetStore {
    path: PathBuf,
    durability: WriteDurability,
    snippets: Mutex<Vec<Snippet>>,
    writer: Mutex<()>,
}

impl SnippetStore {
    /// Loads the store from `path`, creating an empty backing file when there is none.
    pub fn open(path: impl Into<PathBuf>, durability: WriteDurability) -> Result<Self, StoreError> {
        let path = path.into();

        match fs::read(&path) {
            Ok(content) => {
                let snippets: Vec<Snippet> =
                    serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                validate_ids(&path, &snippets)?;
                info!("loaded {} snippets from {}", snippets.len(), path.display());
                Ok(Self {
                    path,
                    durability,
                    snippets: Mutex::new(snippets),
                    writer: Mutex::new(()),
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let store = Self {
                    path,
                    durability,
                    snippets: Mutex::new(Vec::new()),
                    writer: Mutex::new(()),
                };
                store.flush()?;
                info!("initialised empty snippet file {}", store.path.display());
                Ok(store)
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of every snippet in insertion order.
    pub fn all(&self) -> Vec<Snippet> {
        self.lock().clone()
    }

    pub fn get(&self, id: u64) -> Option<Snippet> {
        self.lock().iter().find(|snippet| snippet.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Appends a snippet under the next free id and persists the collection.
    ///
    /// Inputs are stored as given; trimming and validation belong to the caller. The record
    /// only becomes visible in memory once the file write succeeded.
    pub fn add(&self, title: &str, description: &str, code: &str) -> Result<Snippet, StoreError> {
        let _writer = self.lock_writer();

        let mut next = self.all();
        let snippet = Snippet {
            id: next_id(&next)?,
            title: title.to_string(),
            description: description.to_string(),
            code: code.to_string(),
        };
        next.push(snippet.clone());

        self.persist(&next)?;
        // Only writers change the collection, and we hold the writer lock
        self.lock().push(snippet.clone());

        Ok(snippet)
    }

    /// Rewrites the backing file from memory. Called once more on shutdown.
    pub fn flush(&self) -> Result<(), StoreError> {
        let _writer = self.lock_writer();
        let snapshot = self.all();
        self.persist(&snapshot)
    }

    fn persist(&self, snippets: &[Snippet]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snippets)?;
        write_atomic(&self.path, content.as_bytes(), self.durability)?;
        debug!("wrote {} snippets to {}", snippets.len(), self.path.display());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Snippet>> {
        self.snippets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_id(snippets: &[Snippet]) -> Result<u64, StoreError> {
    match snippets.iter().map(|snippet| snippet.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted),
    }
}

fn validate_ids(path: &Path, snippets: &[Snippet]) -> Result<(), StoreError> {
    let mut seen = std::collections::HashSet::with_capacity(snippets.len());
    for snippet in snippets {
        if snippet.id == 0 {
            return Err(StoreError::InvalidId {
                path: path.to_path_buf(),
                id: 0,
                reason: "ids start at 1",
            });
        }
        if !seen.insert(snippet.id) {
            return Err(StoreError::InvalidId {
                path: path.to_path_buf(),
                id: snippet.id,
                reason: "duplicate id",
            });
        }
    }
    Ok(())
}

/// Writes `contents` to a temp file next to `path` and renames it into place.
pub(crate) fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| StoreError::Io { path, source }
    };

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    fs::create_dir_all(parent).map_err(io_err(parent))?;

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}.{}",
        file_name.to_string_lossy(),
        std::process::id(),
        nanos
    ));

    fill_temp_file(&tmp_path, |file| {
        file.write_all(contents)?;
        if durability == WriteDurability::Durable {
            file.sync_all()?;
        }
        Ok(())
    })?;

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    #[cfg(unix)]
    {
        if durability == WriteDurability::Durable {
            let dir = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::File::open(dir)
                .and_then(|handle| handle.sync_all())
                .map_err(io_err(dir))?;
        }
    }

    Ok(())
}

/// Creates `tmp_path` and runs `fill` on it. The file is removed again if `fill` fails.
fn fill_temp_file(
    tmp_path: &Path,
    fill: impl FnOnce(&mut fs::File) -> io::Result<()>,
) -> Result<(), StoreError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        })?;

    let filled = fill(&mut file);
    drop(file);

    if let Err(source) = filled {
        let _ = fs::remove_file(tmp_path);
        return Err(StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
