//! Literal substitution

use tracing::trace;

/// Replace every occurrence of one literal with another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub old: String,
    pub new: String,
    /// Whether comments are rewritten too; `None` leaves it to the format default
    pub comments: Option<bool>,
}

impl Substitution {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            comments: None,
        }
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn rewrites_comments(&self, default: bool) -> bool {
        self.comments.unwrap_or(default)
    }

    /// An empty or identical pair changes nothing
    pub fn is_noop(&self) -> bool {
        self.old.is_empty() || self.old == self.new
    }

    pub fn replace(&self, text: &str) -> String {
        if self.is_noop() {
            text.to_string()
        } else {
            text.replace(&self.old, &self.new)
        }
    }

    /// Substitute inside `line[span]`, returns whether the line changed
    pub fn replace_span(&self, line: &mut String, span: std::ops::Range<usize>) -> bool {
        if self.is_noop() || !line[span.clone()].contains(&self.old) {
            return false;
        }
        let replaced = self.replace(&line[span.clone()]);
        line.replace_range(span, &replaced);
        true
    }

    /// Free-text substitution over whole lines, returns whether anything changed
    pub fn apply_lines(&self, lines: &mut [String]) -> bool {
        let mut changed = false;
        for (lineno, line) in lines.iter_mut().enumerate() {
            let end = line.len();
            if self.replace_span(line, 0..end) {
                trace!(lineno, "substituted");
                changed = true;
            }
        }
        changed
    }
}
