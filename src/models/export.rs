use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::models::storage::{WriteDurability, write_atomic};
use crate::models::{Snippet, SnippetDraft, SnippetStore};

/// Export file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub snippets: Vec<Snippet>,
}

impl ExportData {
    /// Snapshot the store contents into a versioned export envelope
    pub fn from_store(store: &SnippetStore) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            snippets: store.all(),
        }
    }
}

/// Accepted import layouts: a full export envelope or a bare snippet list such as the
/// backing file itself or the `/api/snippets` response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    Envelope(ExportData),
    Bare(Vec<Snippet>),
}

impl ImportPayload {
    fn into_snippets(self) -> Vec<Snippet> {
        match self {
            ImportPayload::Envelope(data) => data.snippets,
            ImportPayload::Bare(snippets) => snippets,
        }
    }
}

/// Export the store to a file as pretty JSON
pub fn export_to_file(store: &SnippetStore, path: &Path) -> Result<usize> {
    let export_data = ExportData::from_store(store);

    let json = serde_json::to_string_pretty(&export_data)
        .context("Failed to serialize snippets to JSON")?;
    write_atomic(path, json.as_bytes(), WriteDurability::Fast)
        .context("Failed to write JSON export file")?;

    info!(
        "exported {} snippets to {}",
        export_data.snippets.len(),
        path.display()
    );
    Ok(export_data.snippets.len())
}

/// Read snippets from an export or snippet file. JSON is tried first, then YAML.
pub fn import_file(path: &Path) -> Result<Vec<Snippet>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file {}", path.display()))?;
    parse_import(&contents)
}

fn parse_import(contents: &str) -> Result<Vec<Snippet>> {
    if let Ok(payload) = serde_json::from_str::<ImportPayload>(contents) {
        return Ok(payload.into_snippets());
    }

    let payload: ImportPayload =
        serde_yaml::from_str(contents).context("Import file is neither snippet JSON nor YAML")?;
    Ok(payload.into_snippets())
}

/// Add imported snippets to the store under fresh ids, returning how many were added.
///
/// Records without a title or code are skipped, the same as a rejected form submission.
pub fn merge_import(store: &SnippetStore, snippets: Vec<Snippet>) -> Result<usize> {
    let mut added = 0;

    for snippet in snippets {
        let draft = SnippetDraft::new(snippet.title, snippet.description, snippet.code);
        if !draft.is_valid() {
            warn!("skipping imported snippet {} without title or code", snippet.id);
            continue;
        }

        let draft = draft.trimmed();
        store
            .add(&draft.title, &draft.description, &draft.code)
            .context("Failed to store imported snippet")?;
        added += 1;
    }

    Ok(added)
}

/// Copy the backing file to a timestamped file inside `backup_dir`
pub fn backup(store: &SnippetStore, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir).with_context(|| {
        format!("Failed to create backup directory {}", backup_dir.display())
    })?;

    store.flush().context("Failed to flush snippets before backup")?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let backup_file = backup_dir.join(format!("backup_{}.json", timestamp));

    fs::copy(store.path(), &backup_file).context("Failed to copy snippet file")?;

    info!("backed up snippets to {}", backup_file.display());
    Ok(backup_file)
}
