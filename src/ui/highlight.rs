use log::warn;
use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};

use crate::ui::escape_html;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "base16-ocean.dark";

fn css_syntax() -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_extension("css")
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

fn theme() -> &'static Theme {
    &THEME_SET.themes[THEME_NAME]
}

/// Highlighted `<pre>` block with inline styles for the detail page.
pub fn css_to_html(code: &str) -> String {
    match highlighted_html_for_string(code, &SYNTAX_SET, css_syntax(), theme()) {
        Ok(html) => html,
        Err(err) => {
            warn!("css highlighting failed, falling back to plain text: {err}");
            format!("<pre><code>{}</code></pre>", escape_html(code))
        }
    }
}

/// 24-bit ANSI colored rendering for `cssnip show`.
pub fn css_to_terminal(code: &str) -> String {
    let mut highlighter = HighlightLines::new(css_syntax(), theme());
    let mut out = String::with_capacity(code.len() * 2);

    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
            Err(_) => out.push_str(line),
        }
    }
    // Reset so following output keeps the terminal's colors
    out.push_str("\x1b[0m");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_output_keeps_code_text_escaped() {
        let html = css_to_html(".a::after{content:\"<b>\"}");
        assert!(html.starts_with("<pre"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn terminal_output_contains_the_source_text() {
        let out = css_to_terminal(".box{color:red}\n");
        assert!(out.contains("\x1b["));
        assert!(out.contains("box"));
        assert!(out.ends_with("\x1b[0m"));
    }
}
