pub mod export;
pub mod snippet;
pub mod storage;

pub use export::{ExportData, backup, export_to_file, import_file, merge_import};
pub use snippet::{Snippet, SnippetDraft};
pub use storage::{SnippetStore, StoreError, WriteDurability};
