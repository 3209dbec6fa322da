use std::fmt::Write;

use crate::models::{Snippet, SnippetDraft};
use crate::ui::{escape_html, highlight};

const SITE_TITLE: &str = "CSS Snippets";

const BASE_STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#191724;color:#e0def4}
header{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#1f1d2e}
header a{color:#ebbcba;text-decoration:none}
main{max-width:56rem;margin:0 auto;padding:1.5rem 2rem}
.snippets{list-style:none;padding:0}
.snippets li{padding:.75rem 1rem;margin-bottom:.5rem;background:#26233a;border-radius:6px}
.snippets a{color:#9ccfd8;font-weight:600}
.muted{color:#908caa}
pre{padding:1rem;border-radius:6px;overflow-x:auto}
.preview-stage{padding:1.5rem;background:#fff;color:#111;border-radius:6px}
.preview-stage>div{margin:.5rem 0}
form label{display:block;margin:.75rem 0 .25rem}
form input,form textarea{width:100%;box-sizing:border-box;padding:.5rem;background:#26233a;color:#e0def4;border:1px solid #403d52;border-radius:4px}
form textarea{font-family:ui-monospace,monospace;min-height:12rem}
button{margin-top:1rem;padding:.5rem 1.25rem;background:#c4a7e7;border:0;border-radius:4px;cursor:pointer}";

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>\n{BASE_STYLE}\n</style>\n{head_extra}</head>\n<body>\n\
         <header><a href=\"/\"><strong>{SITE_TITLE}</strong></a><a href=\"/add\">+ Add snippet</a></header>\n\
         <main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Listing of every snippet, in insertion order.
pub fn index_page(snippets: &[Snippet]) -> String {
    let mut body = format!("<h1>{SITE_TITLE}</h1>\n");

    if snippets.is_empty() {
        body.push_str(
            "<p class=\"muted\">No snippets yet. <a href=\"/add\">Add the first one</a>.</p>\n",
        );
        return layout(SITE_TITLE, "", &body);
    }

    body.push_str("<ul class=\"snippets\">\n");
    for snippet in snippets {
        let _ = write!(
            body,
            "<li><a href=\"/snippet/{id}\">{title}</a>",
            id = snippet.id,
            title = escape_html(&snippet.title)
        );
        if !snippet.description.is_empty() {
            let _ = write!(
                body,
                "<div class=\"muted\">{}</div>",
                escape_html(&snippet.description)
            );
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n");

    layout(SITE_TITLE, "", &body)
}

/// Detail page: highlighted source plus a live preview styled by the snippet itself.
pub fn view_page(snippet: &Snippet) -> String {
    let preview_style = format!("<style>\n{}\n</style>\n", snippet.preview_style());

    let mut body = format!("<h1>{}</h1>\n", escape_html(&snippet.title));
    if !snippet.description.is_empty() {
        let _ = writeln!(
            body,
            "<p class=\"muted\">{}</p>",
            escape_html(&snippet.description)
        );
    }

    body.push_str("<h2>Preview</h2>\n<div class=\"preview-stage\">\n");
    let classes = preview_classes(&snippet.code);
    if classes.is_empty() {
        body.push_str("<div>Preview text</div>\n");
    }
    for class in &classes {
        let _ = writeln!(
            body,
            "<div class=\"{class}\">.{class}</div>",
            class = escape_html(class)
        );
    }
    body.push_str("</div>\n");

    let _ = write!(
        body,
        "<h2>Code <span class=\"muted\">({} lines)</span></h2>\n{}\n",
        snippet.line_count(),
        highlight::css_to_html(&snippet.code)
    );
    body.push_str("<p><a href=\"/\">&larr; Back to all snippets</a></p>\n");

    layout(&snippet.title, &preview_style, &body)
}

/// Submission form, pre-filled with whatever was submitted last.
pub fn add_page(draft: &SnippetDraft) -> String {
    let body = format!(
        "<h1>Add snippet</h1>\n\
         <form method=\"post\" action=\"/add\">\n\
         <label for=\"title\">Title</label>\n\
         <input id=\"title\" name=\"title\" value=\"{title}\" required>\n\
         <label for=\"description\">Description</label>\n\
         <input id=\"description\" name=\"description\" value=\"{description}\">\n\
         <label for=\"code\">CSS</label>\n\
         <textarea id=\"code\" name=\"code\" required>{code}</textarea>\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n",
        title = escape_html(&draft.title),
        description = escape_html(&draft.description),
        code = escape_html(&draft.code),
    );
    layout("Add snippet", "", &body)
}

/// Class names used in selectors, in first-seen order, so the preview has elements to style.
///
/// Declaration blocks are skipped, so values like `1.5rem` or `url(a.png)` never count.
/// Blocks opened by at-rules such as `@media` are still selector context.
fn preview_classes(code: &str) -> Vec<String> {
    let chars: Vec<char> = code.chars().collect();
    let mut classes: Vec<String> = Vec::new();
    // One entry per open brace: true when the block holds rules rather than declarations
    let mut blocks: Vec<bool> = Vec::new();
    let mut prelude_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let in_selector = blocks.iter().all(|holds_rules| *holds_rules);
        match chars[i] {
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            '{' => {
                let prelude: String = chars[prelude_start..i].iter().collect();
                blocks.push(in_selector && prelude.trim_start().starts_with('@'));
                prelude_start = i + 1;
            }
            '}' => {
                blocks.pop();
                prelude_start = i + 1;
            }
            ';' => prelude_start = i + 1,
            '.' if in_selector => {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_alphanumeric() || **c == '-' || **c == '_')
                    .collect();
                let starts_like_ident = name
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '-' || c == '_');
                if starts_like_ident && !classes.contains(&name) {
                    classes.push(name.clone());
                }
                i += 1 + name.chars().count();
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(title: &str, description: &str, code: &str) -> Snippet {
        Snippet {
            id: 4,
            title: title.into(),
            description: description.into(),
            code: code.into(),
        }
    }

    #[test]
    fn index_links_every_snippet_in_order() {
        let html = index_page(&[
            snippet("First", "", "a{}"),
            Snippet {
                id: 9,
                ..snippet("Second", "two", "b{}")
            },
        ]);
        let first = html.find("/snippet/4").unwrap();
        let second = html.find("/snippet/9").unwrap();
        assert!(first < second);
        assert!(html.contains(">two<"));
    }

    #[test]
    fn index_of_empty_store_invites_to_add() {
        let html = index_page(&[]);
        assert!(html.contains("No snippets yet"));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = index_page(&[snippet("<script>x</script>", "", "a{}")]);
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn view_page_embeds_preview_style_and_sample_elements() {
        let html = view_page(&snippet(
            "Rounded Box",
            "soft corners",
            ".box{border-radius:8px}",
        ));
        assert!(html.contains("<style>\n.box{border-radius:8px}\n</style>"));
        assert!(html.contains("<div class=\"box\">.box</div>"));
        assert!(html.contains("soft corners"));
        assert!(html.contains("(1 lines)"));
    }

    #[test]
    fn add_page_keeps_submitted_values() {
        let html = add_page(&SnippetDraft::new("", "desc \"q\"", ".x{}"));
        assert!(html.contains("value=\"desc &quot;q&quot;\""));
        assert!(html.contains(">.x{}</textarea>"));
        assert!(html.contains("method=\"post\" action=\"/add\""));
    }

    #[test]
    fn preview_classes_come_from_selectors_only() {
        let css = "/* .commented */\n.btn, .btn-primary:hover > .icon { margin: 1.5rem; background: url(a.png) }\n\
                   @media (max-width: 600px) { .btn { padding: .5rem } .stack{} }";
        assert_eq!(
            preview_classes(css),
            ["btn", "btn-primary", "icon", "stack"]
        );
    }

    #[test]
    fn preview_classes_ignore_numbers() {
        assert!(preview_classes("div{opacity:.5} p{}").is_empty());
        assert!(preview_classes(".5x{}").is_empty());
    }
}
