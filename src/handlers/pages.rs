use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::{debug, info};

use crate::handlers::{AppError, AppState};
use crate::models::SnippetDraft;
use crate::ui::pages;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::index_page(&state.store.all()))
}

/// Unknown or malformed ids go back to the listing instead of an error page.
pub async fn view_snippet(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let snippet = raw_id
        .parse::<u64>()
        .ok()
        .and_then(|id| state.store.get(id));

    match snippet {
        Some(snippet) => Html(pages::view_page(&snippet)).into_response(),
        None => {
            debug!("no snippet with id {raw_id:?}, redirecting to listing");
            Redirect::to("/").into_response()
        }
    }
}

pub async fn add_form() -> Html<String> {
    Html(pages::add_page(&SnippetDraft::default()))
}

pub async fn add_snippet(
    State(state): State<AppState>,
    Form(draft): Form<SnippetDraft>,
) -> Result<Response, AppError> {
    let draft = draft.trimmed();
    if !draft.is_valid() {
        debug!("rejected snippet submission without title or code");
        return Ok(Html(pages::add_page(&draft)).into_response());
    }

    let store = state.store.clone();
    let snippet = tokio::task::spawn_blocking(move || {
        store.add(&draft.title, &draft.description, &draft.code)
    })
    .await??;

    info!("added snippet {} ({})", snippet.id, snippet.title);
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use axum::http::{StatusCode, header};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::models::{SnippetStore, WriteDurability};

    struct Ctx {
        _dir: TempDir,
        state: AppState,
    }

    #[fixture]
    fn ctx() -> Ctx {
        let dir = TempDir::new().unwrap();
        let store =
            SnippetStore::open(dir.path().join("snippets.json"), WriteDurability::Fast).unwrap();
        Ctx {
            _dir: dir,
            state: AppState::new(Arc::new(store)),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[rstest]
    #[tokio::test]
    async fn valid_submission_adds_and_redirects(ctx: Ctx) {
        let draft = SnippetDraft::new("  Rounded Box ", "", " .box{border-radius:8px}\n");
        let response = add_snippet(State(ctx.state.clone()), Form(draft))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));

        let stored = ctx.state.store.get(1).unwrap();
        assert_eq!(stored.title, "Rounded Box");
        assert_eq!(stored.code, ".box{border-radius:8px}");
    }

    #[rstest]
    #[case::empty_title("   ", ".box{}")]
    #[case::empty_code("Box", "  ")]
    #[tokio::test]
    async fn invalid_submission_redisplays_form(
        ctx: Ctx,
        #[case] title: &str,
        #[case] code: &str,
    ) {
        let draft = SnippetDraft::new(title, "kept description", code);
        let response = add_snippet(State(ctx.state.clone()), Form(draft))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.state.store.is_empty());
        let body = body_text(response).await;
        assert!(body.contains("<form"));
        assert!(body.contains("kept description"));
    }

    #[rstest]
    #[tokio::test]
    async fn view_renders_existing_snippet(ctx: Ctx) {
        ctx.state.store.add("Pill", "rounded", ".pill{}").unwrap();
        let response = view_snippet(State(ctx.state.clone()), Path("1".to_string())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<h1>Pill</h1>"));
    }

    #[rstest]
    #[case::missing("2")]
    #[case::not_a_number("abc")]
    #[case::negative("-1")]
    #[tokio::test]
    async fn view_of_unknown_id_redirects_home(ctx: Ctx, #[case] raw_id: &str) {
        ctx.state.store.add("Pill", "", ".pill{}").unwrap();
        let response = view_snippet(State(ctx.state.clone()), Path(raw_id.to_string())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));
    }

    #[rstest]
    #[tokio::test]
    async fn index_lists_snippets(ctx: Ctx) {
        ctx.state.store.add("Alpha", "", "a{}").unwrap();
        ctx.state.store.add("Beta", "", "b{}").unwrap();
        let body = index(State(ctx.state.clone())).await.0;
        assert!(body.find("Alpha").unwrap() < body.find("Beta").unwrap());
    }

    #[tokio::test]
    async fn add_form_starts_empty() {
        let body = add_form().await.0;
        assert!(body.contains("value=\"\""));
        assert!(body.contains("></textarea>"));
    }
}
