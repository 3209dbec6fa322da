use axum::Json;
use axum::extract::State;

use crate::handlers::AppState;
use crate::models::Snippet;

/// `GET /api/snippets`: the whole collection as a bare JSON array.
pub async fn list_snippets(State(state): State<AppState>) -> Json<Vec<Snippet>> {
    Json(state.store.all())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::models::{SnippetStore, WriteDurability};

    fn state(dir: &TempDir) -> AppState {
        let store =
            SnippetStore::open(dir.path().join("snippets.json"), WriteDurability::Fast).unwrap();
        AppState::new(Arc::new(store))
    }

    #[tokio::test]
    async fn empty_store_exports_empty_list() {
        let dir = TempDir::new().unwrap();
        let Json(snippets) = list_snippets(State(state(&dir))).await;
        assert!(snippets.is_empty());
        assert_eq!(serde_json::to_string(&snippets).unwrap(), "[]");
    }

    #[tokio::test]
    async fn export_matches_store_order() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        state.store.add("One", "", "a{}").unwrap();
        state.store.add("Two", "second", "b{}").unwrap();

        let Json(snippets) = list_snippets(State(state.clone())).await;
        assert_eq!(snippets, state.store.all());
        assert_eq!(
            serde_json::to_value(&snippets[1]).unwrap(),
            serde_json::json!({"id": 2, "title": "Two", "description": "second", "code": "b{}"})
        );
    }
}
