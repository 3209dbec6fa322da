use serde::{Deserialize, Serialize};

/// A stored CSS snippet.
///
/// Field order here is the field order of the backing file and of the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snippet {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub code: String,
}

impl Snippet {
    /// Returns the snippet's CSS for embedding into a `<style>` block.
    ///
    /// `</` is broken up so the code cannot terminate the surrounding element.
    pub fn preview_style(&self) -> String {
        self.code.replace("</", "<\\/")
    }

    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}

/// Raw user submission for a new snippet, as posted by the add form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SnippetDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
}

impl SnippetDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            code: code.into(),
        }
    }

    /// Trims surrounding whitespace from every field
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            code: self.code.trim().to_string(),
        }
    }

    /// A draft is accepted when title and code are both non-blank.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.code.trim().is_empty()
    }
}
