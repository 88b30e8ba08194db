//! Core data types shared by the tag index and the retrieval pipeline.
//!
//! Everything here is ephemeral: values are rebuilt from the corpus on every
//! invocation and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ClassifierError;

/// An inline `[category:value]` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag {
    pub category: String,
    pub value: String,
}

impl Tag {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.category, self.value)
    }
}

/// One tagged line of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Note path, relative to the corpus root.
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Line text without its terminator.
    pub text: String,
    /// Distinct tags on the line, in order of first appearance.
    pub tags: Vec<Tag>,
}

impl Occurrence {
    /// True when every tag in `query` is present on this line.
    pub fn has_all(&self, query: &[Tag]) -> bool {
        query.iter().all(|q| self.tags.contains(q))
    }
}

/// A tag search match: `path:line` plus the line text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagHit {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
}

impl From<Occurrence> for TagHit {
    fn from(occ: Occurrence) -> Self {
        Self {
            path: occ.path,
            line: occ.line,
            text: occ.text,
        }
    }
}

/// Number of lines across the corpus carrying a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: Tag,
    pub count: usize,
}

/// Closed set of query categories.
///
/// `Default` is the "unclassified" value returned when no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Training,
    Relation,
    Pet,
    System,
    Mood,
    Companion,
    Project,
    Default,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Training,
        Category::Relation,
        Category::Pet,
        Category::System,
        Category::Mood,
        Category::Companion,
        Category::Project,
        Category::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Training => "training",
            Category::Relation => "relation",
            Category::Pet => "pet",
            Category::System => "system",
            Category::Mood => "mood",
            Category::Companion => "companion",
            Category::Project => "project",
            Category::Default => "default",
        }
    }

    /// Categories whose notes are named after a person or animal, so the
    /// scorer boosts files whose stem matches a name in the query.
    pub fn is_entity_lookup(&self) -> bool {
        matches!(self, Category::Relation | Category::Pet)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ClassifierError::UnknownCategory(s.to_string()))
    }
}

/// Whether a scope entry names a single note or a directory to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    File,
    Dir,
}

/// A corpus-relative path designated as relevant to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopePath {
    pub path: PathBuf,
    pub kind: ScopeKind,
}

impl ScopePath {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ScopeKind::File,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ScopeKind::Dir,
        }
    }

    /// Parse a configured scope entry.
    ///
    /// A trailing `/` forces a directory; otherwise entries carrying the note
    /// extension are files and everything else is a directory.
    pub fn parse(entry: &str, extension: &str) -> Self {
        let entry = entry.trim();
        if let Some(stripped) = entry.strip_suffix('/') {
            return Self::dir(stripped.trim_end_matches('/'));
        }
        let path = PathBuf::from(entry);
        let is_note = path
            .extension()
            .map(|ext| ext == extension)
            .unwrap_or(false);
        if is_note {
            Self::file(path)
        } else {
            Self::dir(path)
        }
    }
}

/// A note ranked by the relevance scorer. `score` is always in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub path: PathBuf,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("  Food ".parse::<Category>().unwrap(), Category::Food);
    }

    #[test]
    fn test_unknown_category_name() {
        let err = "weather".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("weather"));
    }

    #[test]
    fn test_scope_path_parse() {
        assert_eq!(ScopePath::parse("connections.md", "md"), ScopePath::file("connections.md"));
        assert_eq!(ScopePath::parse("food", "md"), ScopePath::dir("food"));
        assert_eq!(ScopePath::parse("current/food/", "md"), ScopePath::dir("current/food"));
        assert_eq!(ScopePath::parse("notes.md/", "md"), ScopePath::dir("notes.md"));
    }

    #[test]
    fn test_occurrence_has_all() {
        let occ = Occurrence {
            path: PathBuf::from("a.md"),
            line: 1,
            text: "x".to_string(),
            tags: vec![Tag::new("人物", "刘辉"), Tag::new("类型", "开票信息")],
        };
        assert!(occ.has_all(&[]));
        assert!(occ.has_all(&[Tag::new("人物", "刘辉")]));
        assert!(!occ.has_all(&[Tag::new("人物", "刘辉"), Tag::new("类型", "其他")]));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::new("人物", "A").to_string(), "[人物:A]");
    }
}
