//! Scope resolver: which corpus paths are relevant to a category.
//!
//! The mapping is static configuration. Categories without an entry, and
//! category names that are not recognised at all, use the
//! [`Category::Default`] scopes.

use tracing::debug;

use crate::models::{Category, ScopePath};

#[derive(Debug, Clone)]
pub struct ScopeResolver {
    mapping: Vec<(Category, Vec<ScopePath>)>,
}

impl ScopeResolver {
    pub fn new(mapping: Vec<(Category, Vec<ScopePath>)>) -> Self {
        Self { mapping }
    }

    /// Built-in mapping for the standard corpus layout.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            (
                Category::Food,
                vec![ScopePath::dir("food"), ScopePath::dir("current/food")],
            ),
            (
                Category::Training,
                vec![ScopePath::dir("training"), ScopePath::dir("current/training")],
            ),
            (
                Category::Relation,
                vec![ScopePath::dir("relations"), ScopePath::file("connections.md")],
            ),
            (
                Category::Pet,
                vec![ScopePath::dir("relations/pets"), ScopePath::file("connections.md")],
            ),
            (Category::System, vec![ScopePath::dir("system")]),
            (Category::Mood, vec![ScopePath::dir("current")]),
            (Category::Companion, vec![ScopePath::dir("current")]),
            (
                Category::Project,
                vec![ScopePath::dir("current"), ScopePath::dir("misc")],
            ),
            (Category::Default, vec![ScopePath::dir("current")]),
        ])
    }

    /// Replaces (or adds) the scopes of one category.
    pub fn set(&mut self, category: Category, scopes: Vec<ScopePath>) {
        match self.mapping.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = scopes,
            None => self.mapping.push((category, scopes)),
        }
    }

    /// Scopes for `category`, in priority order.
    pub fn resolve(&self, category: Category) -> &[ScopePath] {
        self.lookup(category)
            .or_else(|| {
                debug!(%category, "no scopes mapped, using default");
                self.lookup(Category::Default)
            })
            .unwrap_or(&[])
    }

    /// Like [`resolve`](Self::resolve) for a category given by name.
    pub fn resolve_named(&self, name: &str) -> &[ScopePath] {
        match name.parse::<Category>() {
            Ok(category) => self.resolve(category),
            Err(_) => {
                debug!(name, "unknown category, using default scopes");
                self.resolve(Category::Default)
            }
        }
    }

    fn lookup(&self, category: Category) -> Option<&[ScopePath]> {
        self.mapping
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, scopes)| scopes.as_slice())
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}
