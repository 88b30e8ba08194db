//! # Memory Harness Core
//!
//! Filesystem-free engine for Memory Harness: note and tag models, the
//! corpus scanner, the tag index, the query classifier, the scope resolver
//! and the relevance scorer.
//!
//! The corpus is reached only through [`provider::NoteProvider`]. The
//! application crate supplies a filesystem provider; tests use
//! [`provider::memory::InMemoryProvider`].
//!
//! ```text
//! query ─▶ QueryClassifier ─▶ Category ─▶ ScopeResolver ─▶ [ScopePath]
//!                                                              │
//!                              NoteProvider ◀── CorpusScanner ◀┤
//!                                                              ▼
//!                                                  RelevanceScorer ─▶ ranked notes
//!
//! NoteProvider ─▶ CorpusScanner ─▶ TagIndex ─▶ search / list_tags
//! ```

pub mod classify;
pub mod error;
pub mod models;
pub mod provider;
pub mod retrieve;
pub mod scan;
pub mod scope;
pub mod score;
pub mod tags;

pub use classify::{ClassifierRule, QueryClassifier};
pub use error::{ClassifierError, TagError};
pub use models::{
    Category, Occurrence, ScopeKind, ScopePath, ScoredCandidate, Tag, TagCount, TagHit,
};
pub use provider::{EntryKind, NoteProvider};
pub use retrieve::{Retrieval, Retriever};
pub use scan::CorpusScanner;
pub use scope::ScopeResolver;
pub use score::{EntityMatcher, RelevanceScorer};
pub use tags::TagIndex;
