//! HTML and terminal rendering.
//!
//! - **`pages`**: full HTML documents for the list, detail and add views
//! - **`highlight`**: CSS syntax highlighting for the browser and the terminal

pub mod highlight;
pub mod pages;

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
