//! Inline tag extraction and the tag index.
//!
//! Tags are `[category:value]` annotations anywhere in a line. Brackets do
//! not nest and neither part may contain `:`, `[` or `]`.
//!
//! The index holds no state of its own: every operation rescans the corpus
//! through the [`NoteProvider`], so the note text is always the source of
//! truth and edits show up on the next call.
//!
//! # Operations
//!
//! - [`TagIndex::scan`]: every tagged line, in corpus order.
//! - [`TagIndex::search`]: lines carrying *all* requested tags.
//! - [`TagIndex::list_tags`]: per-tag line counts, most frequent first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::TagError;
use crate::models::{Occurrence, Tag, TagCount, TagHit};
use crate::provider::NoteProvider;
use crate::scan::CorpusScanner;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^:\[\]]+):([^:\[\]]+)\]").unwrap());

/// Extracts the distinct tags of a line, in order of first appearance.
///
/// Both parts are trimmed, matching [`Tag::parse_query`]; a part that is
/// blank after trimming drops the tag.
pub fn extract_tags(line: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for caps in TAG_RE.captures_iter(line) {
        let (category, value) = (caps[1].trim(), caps[2].trim());
        if category.is_empty() || value.is_empty() {
            continue;
        }
        let tag = Tag::new(category, value);
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl Tag {
    /// Parses a command-line tag token: `category:value` or `[category:value]`.
    ///
    /// Splits at the first `:`.
    pub fn parse_query(token: &str) -> Result<Tag, TagError> {
        let clean = token.trim().trim_matches(|c| c == '[' || c == ']');
        let (category, value) = clean
            .split_once(':')
            .ok_or_else(|| TagError::MissingSeparator(token.to_string()))?;
        let (category, value) = (category.trim(), value.trim());
        if category.is_empty() || value.is_empty() {
            return Err(TagError::EmptyPart(token.to_string()));
        }
        let illegal = |s: &str| s.contains([':', '[', ']']);
        if illegal(category) || illegal(value) {
            return Err(TagError::IllegalCharacter(token.to_string()));
        }
        Ok(Tag::new(category, value))
    }
}

/// Tag index over the whole corpus.
pub struct TagIndex<'a, P: NoteProvider + ?Sized> {
    provider: &'a P,
    scanner: CorpusScanner,
}

impl<'a, P: NoteProvider + ?Sized> TagIndex<'a, P> {
    pub fn new(provider: &'a P, scanner: CorpusScanner) -> Self {
        Self { provider, scanner }
    }

    /// Lazily yields every tagged line of every active note.
    ///
    /// Notes that cannot be read or decoded are skipped with a warning.
    pub fn scan(&self) -> impl Iterator<Item = Occurrence> + '_ {
        self.scanner
            .notes(self.provider, Path::new(""))
            .flat_map(move |path| self.occurrences_in(path))
    }

    fn occurrences_in(&self, path: PathBuf) -> Vec<Occurrence> {
        let lines = match self.provider.read_lines(&path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable note");
                return Vec::new();
            }
        };
        lines
            .into_iter()
            .enumerate()
            .filter_map(|(i, text)| {
                let tags = extract_tags(&text);
                (!tags.is_empty()).then(|| Occurrence {
                    path: path.clone(),
                    line: i + 1,
                    text,
                    tags,
                })
            })
            .collect()
    }

    /// Lines carrying every tag in `query` (AND semantics), in scan order.
    pub fn search(&self, query: &[Tag]) -> Vec<TagHit> {
        self.scan()
            .filter(|occ| occ.has_all(query))
            .map(TagHit::from)
            .collect()
    }

    /// Counts the lines carrying each distinct tag.
    ///
    /// Sorted by count descending, then category, then value.
    pub fn list_tags(&self, category: Option<&str>) -> Vec<TagCount> {
        let mut counts: HashMap<Tag, usize> = HashMap::new();
        for occ in self.scan() {
            for tag in occ.tags {
                if category.is_some_and(|c| tag.category != c) {
                    continue;
                }
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        let mut listing: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        listing.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.tag.category.cmp(&b.tag.category))
                .then_with(|| a.tag.value.cmp(&b.tag.value))
        });
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::InMemoryProvider;
    use chrono::Utc;

    fn corpus() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_note(
                "current/2026-02-16.md",
                "# 2026-02-16\n\
                 和王隆哲吃饭 [人物:王隆哲] [类型:开票信息]\n\
                 plain line\n\
                 [人物:刘辉] 来电",
            )
            .with_note(
                "relations/刘辉.md",
                "[人物:刘辉] [人物:刘辉] 老同学\n[地点:成都][人物:刘辉]",
            )
            .with_note(
                "archived/2025-01/old.md",
                "[人物:王隆哲] [类型:开票信息]",
            )
    }

    fn index(provider: &InMemoryProvider) -> TagIndex<'_, InMemoryProvider> {
        TagIndex::new(provider, CorpusScanner::default())
    }

    #[test]
    fn test_extract_tags() {
        let tags = extract_tags("a [人物:刘辉] b [类型:开票信息] [bad] [x:y:z] [[n:v]]");
        assert_eq!(
            tags,
            vec![
                Tag::new("人物", "刘辉"),
                Tag::new("类型", "开票信息"),
                Tag::new("n", "v"),
            ]
        );
        assert!(extract_tags("no tags here").is_empty());
    }

    #[test]
    fn test_extract_tags_dedupes_within_line() {
        let tags = extract_tags("[a:b] [a:b] [a:c]");
        assert_eq!(tags, vec![Tag::new("a", "b"), Tag::new("a", "c")]);
    }

    #[test]
    fn test_extract_tags_trims_parts() {
        let tags = extract_tags("[人物: 刘辉] [ 地点 :成都 ] [ : x]");
        assert_eq!(tags, vec![Tag::new("人物", "刘辉"), Tag::new("地点", "成都")]);
    }

    #[test]
    fn test_spaced_tag_is_searchable_as_listed() {
        let provider = InMemoryProvider::new().with_note("current/a.md", "见面 [人物: 刘辉]");
        let idx = index(&provider);
        let listing = idx.list_tags(None);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].tag, Tag::new("人物", "刘辉"));

        let listed = Tag::parse_query(&listing[0].tag.to_string()).unwrap();
        assert_eq!(idx.search(&[listed]).len(), 1);
        let spaced = Tag::parse_query("[人物: 刘辉]").unwrap();
        assert_eq!(idx.search(&[spaced]).len(), 1);
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(Tag::parse_query("人物:刘辉").unwrap(), Tag::new("人物", "刘辉"));
        assert_eq!(Tag::parse_query("[人物:刘辉]").unwrap(), Tag::new("人物", "刘辉"));
        assert_eq!(
            Tag::parse_query("人物").unwrap_err(),
            TagError::MissingSeparator("人物".to_string())
        );
        assert!(matches!(Tag::parse_query("人物:"), Err(TagError::EmptyPart(_))));
        assert!(matches!(Tag::parse_query(":刘辉"), Err(TagError::EmptyPart(_))));
        assert!(matches!(
            Tag::parse_query("a:b:c"),
            Err(TagError::IllegalCharacter(_))
        ));
    }

    #[test]
    fn test_scan_order_and_line_numbers() {
        let provider = corpus();
        let occs: Vec<Occurrence> = index(&provider).scan().collect();
        let located: Vec<(String, usize)> = occs
            .iter()
            .map(|o| (o.path.display().to_string(), o.line))
            .collect();
        assert_eq!(
            located,
            vec![
                ("current/2026-02-16.md".to_string(), 2),
                ("current/2026-02-16.md".to_string(), 4),
                ("relations/刘辉.md".to_string(), 1),
                ("relations/刘辉.md".to_string(), 2),
            ]
        );
        assert_eq!(occs[0].text, "和王隆哲吃饭 [人物:王隆哲] [类型:开票信息]");
    }

    #[test]
    fn test_search_and_semantics() {
        let provider = corpus();
        let idx = index(&provider);

        let single = idx.search(&[Tag::new("人物", "王隆哲")]);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].path, PathBuf::from("current/2026-02-16.md"));
        assert_eq!(single[0].line, 2);

        let both = idx.search(&[
            Tag::new("人物", "王隆哲"),
            Tag::new("类型", "开票信息"),
        ]);
        assert_eq!(both, single);

        let other = idx.search(&[Tag::new("人物", "王隆哲"), Tag::new("类型", "其他")]);
        assert!(other.is_empty());

        // tags on different lines of the same note do not combine
        let split = idx.search(&[Tag::new("人物", "王隆哲"), Tag::new("人物", "刘辉")]);
        assert!(split.is_empty());
    }

    #[test]
    fn test_search_never_returns_archived_notes() {
        let provider = corpus();
        let hits = index(&provider).search(&[Tag::new("类型", "开票信息")]);
        assert!(hits
            .iter()
            .all(|h| !h.path.starts_with("archived")));
    }

    #[test]
    fn test_list_tags_counts_distinct_lines() {
        let provider = corpus();
        let listing = index(&provider).list_tags(None);
        assert_eq!(
            listing,
            vec![
                TagCount { tag: Tag::new("人物", "刘辉"), count: 3 },
                TagCount { tag: Tag::new("人物", "王隆哲"), count: 1 },
                TagCount { tag: Tag::new("地点", "成都"), count: 1 },
                TagCount { tag: Tag::new("类型", "开票信息"), count: 1 },
            ]
        );
    }

    #[test]
    fn test_list_tags_category_filter_narrows() {
        let provider = corpus();
        let idx = index(&provider);
        let all = idx.list_tags(None);
        let people = idx.list_tags(Some("人物"));
        assert_eq!(people.len(), 2);
        assert!(people.len() < all.len());
        assert!(people.iter().all(|c| c.tag.category == "人物"));
        assert!(idx.list_tags(Some("无此分类")).is_empty());
    }

    #[test]
    fn test_undecodable_note_is_skipped() {
        let mut provider = corpus();
        provider.insert_bytes("current/binary.md", vec![b'[', 0xff, b':', b'x', b']'], Utc::now());
        let occs: Vec<Occurrence> = index(&provider).scan().collect();
        assert_eq!(occs.len(), 4);
    }

    #[test]
    fn test_rescan_reflects_edits() {
        let mut provider = InMemoryProvider::new().with_note("current/a.md", "hello");
        let tag = Tag::new("人物", "A");
        assert!(index(&provider).search(&[tag.clone()]).is_empty());

        provider.insert("current/a.md", "hello\n见面 [人物:A]");
        let hits = index(&provider).search(&[tag.clone()]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);

        provider.insert("current/a.md", "hello");
        assert!(index(&provider).search(&[tag]).is_empty());
    }
}
