use serde::{Deserialize, Serialize};

/// One choice offered for manual disambiguation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub label: String,
    pub label2: Option<String>,
    pub thumb: Option<String>,
}

impl Candidate {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_label2(mut self, label2: Option<String>) -> Self {
        self.label2 = label2;
        self
    }

    pub fn with_thumb(mut self, thumb: Option<String>) -> Self {
        self.thumb = thumb;
        self
    }
}

/// Lets the user pick among several search results.
///
/// The GUI front-end implements this with its own list dialog. `None` means
/// the user cancelled, which the caller treats as "no result".
pub trait Selector: Send + Sync {
    fn select(&self, heading: &str, candidates: &[Candidate]) -> Option<usize>;
}

/// Non-interactive selector: always the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoSelect;

impl Selector for AutoSelect {
    fn select(&self, _heading: &str, candidates: &[Candidate]) -> Option<usize> {
        if candidates.is_empty() { None } else { Some(0) }
    }
}
