//! Retrieval pipeline: classify → resolve scopes → score.
//!
//! [`Retriever`] owns the three stages and is the entry point frontends
//! (CLI, tests) call. It holds no corpus state; the provider is passed per
//! call.

use serde::Serialize;

use crate::classify::QueryClassifier;
use crate::models::{Category, ScoredCandidate};
use crate::provider::NoteProvider;
use crate::scope::ScopeResolver;
use crate::score::RelevanceScorer;

/// Outcome of one retrieval call.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub category: Category,
    pub candidates: Vec<ScoredCandidate>,
}

#[derive(Debug, Clone, Default)]
pub struct Retriever {
    classifier: QueryClassifier,
    resolver: ScopeResolver,
    scorer: RelevanceScorer,
}

impl Retriever {
    pub fn new(
        classifier: QueryClassifier,
        resolver: ScopeResolver,
        scorer: RelevanceScorer,
    ) -> Self {
        Self {
            classifier,
            resolver,
            scorer,
        }
    }

    pub fn classify(&self, query: &str) -> Category {
        self.classifier.classify(query)
    }

    /// Classifies `query` and returns at most `top_k` ranked notes.
    pub fn retrieve<P>(&self, provider: &P, query: &str, top_k: usize) -> Retrieval
    where
        P: NoteProvider + ?Sized,
    {
        let category = self.classify(query);
        self.retrieve_as(provider, query, category, top_k)
    }

    /// Skips classification and scores `query` as `category`.
    pub fn retrieve_as<P>(
        &self,
        provider: &P,
        query: &str,
        category: Category,
        top_k: usize,
    ) -> Retrieval
    where
        P: NoteProvider + ?Sized,
    {
        let scopes = self.resolver.resolve(category);
        let candidates = self.scorer.score(provider, query, category, scopes, top_k);
        Retrieval {
            category,
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::InMemoryProvider;
    use crate::score::BASE_SCORE;
    use std::path::PathBuf;

    fn corpus() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_note("archived/2025-01/午饭.md", "old lunch")
            .with_note("current/2026-02-16.md", "today")
            .with_note("current/food/2026-02-16.md", "[食物:面条]")
            .with_note("food/火锅.md", "hotpot")
            .with_note("connections.md", "people index")
    }

    #[test]
    fn test_lunch_query_end_to_end() {
        let provider = corpus();
        let result = Retriever::default().retrieve(&provider, "午饭吃了什么", 5);
        assert_eq!(result.category, Category::Food);
        let paths: Vec<PathBuf> = result.candidates.iter().map(|c| c.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("food/火锅.md"),
                PathBuf::from("current/food/2026-02-16.md"),
            ]
        );
        assert!(result.candidates.iter().all(|c| c.score == BASE_SCORE));
    }

    #[test]
    fn test_unclassified_query_uses_default_scope() {
        let provider = corpus();
        let result = Retriever::default().retrieve(&provider, "今天天气如何", 5);
        assert_eq!(result.category, Category::Default);
        assert_eq!(result.candidates.len(), 2);
        assert!(result
            .candidates
            .iter()
            .all(|c| c.path.starts_with("current")));
    }

    #[test]
    fn test_relation_query_resolves_index_file() {
        let provider = corpus();
        let result = Retriever::default().retrieve(&provider, "我的朋友们", 5);
        assert_eq!(result.category, Category::Relation);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].path, PathBuf::from("connections.md"));
        assert_eq!(result.candidates[0].score, 1.0);
    }

    #[test]
    fn test_retrieve_as_bypasses_classifier() {
        let provider = corpus();
        let result = Retriever::default().retrieve_as(&provider, "午饭", Category::Mood, 1);
        assert_eq!(result.category, Category::Mood);
        assert_eq!(result.candidates.len(), 1);
    }
}
