//! Units of crawl work

use serde::Deserialize;
use std::fmt;

/// What a task's URL points at, and therefore how a worker processes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Storefront landing page carrying the main navigation menu
    Home,

    /// Category listing: sub-navigation, product tiles, "load more" pagination
    Category,

    /// Product detail page (HTML)
    Product,

    /// Colour variation endpoint (JSON with an embedded HTML fragment)
    ProductVariation,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Home,
        TaskKind::Category,
        TaskKind::Product,
        TaskKind::ProductVariation,
    ];

    /// Dense index, used by per-kind counters
    pub fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Category => 1,
            Self::Product => 2,
            Self::ProductVariation => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Category => "category",
            Self::Product => "product",
            Self::ProductVariation => "product_variation",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL paired with the way it must be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub kind: TaskKind,
    pub url: String,
}

impl Task {
    pub fn new(kind: TaskKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, kind) in TaskKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_display() {
        let task = Task::new(TaskKind::ProductVariation, "https://example.com/v?pid=1");
        assert_eq!(task.to_string(), "product_variation https://example.com/v?pid=1");
    }
}
