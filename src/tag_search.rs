//! `mem tags`: AND search over inline tags and tag frequency listing.

use anyhow::{bail, Result};
use serde::Serialize;

use memory_harness_core::{Tag, TagCount, TagHit, TagIndex};

use crate::config::Config;
use crate::fs_provider::FsProvider;

/// Parses every token or fails on the first malformed one.
pub fn parse_query_tags(tokens: &[String]) -> Result<Vec<Tag>> {
    if tokens.is_empty() {
        bail!("at least one tag (category:value) is required");
    }
    let mut tags = Vec::with_capacity(tokens.len());
    for token in tokens {
        let tag = Tag::parse_query(token)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a [Tag],
    hits: &'a [TagHit],
}

pub fn run_tag_search(config: &Config, tokens: &[String], json: bool) -> Result<()> {
    let query = parse_query_tags(tokens)?;
    let provider = FsProvider::from_config(config)?;
    let index = TagIndex::new(&provider, config.scanner());
    let hits = index.search(&query);

    if json {
        let out = SearchOutput {
            query: &query,
            hits: &hits,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let query_display = query
        .iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(" AND ");

    if hits.is_empty() {
        println!("No matches for {}.", query_display);
        return Ok(());
    }

    println!("Search {}: {} result(s)\n", query_display, hits.len());
    for hit in &hits {
        println!("  {}:{}", hit.path.display(), hit.line);
        println!("    {}\n", hit.text);
    }
    Ok(())
}

pub fn run_list_tags(config: &Config, category: Option<&str>, json: bool) -> Result<()> {
    let provider = FsProvider::from_config(config)?;
    let index = TagIndex::new(&provider, config.scanner());
    let listing = index.list_tags(category);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.is_empty() {
        println!("No tags found.");
        return Ok(());
    }

    println!("{} distinct tag(s)\n", listing.len());
    print!("{}", format_listing(&listing));
    Ok(())
}

/// Groups a sorted listing by category.
///
/// Categories appear in order of their most frequent tag; tags keep the
/// listing order within each group.
pub fn format_listing(listing: &[TagCount]) -> String {
    let mut groups: Vec<(&str, Vec<&TagCount>)> = Vec::new();
    for entry in listing {
        let category = entry.tag.category.as_str();
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((category, vec![entry])),
        }
    }

    let mut out = String::new();
    for (i, (category, entries)) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("【{}】\n", category));
        for entry in entries {
            out.push_str(&format!("  {}  ×{}\n", entry.tag, entry.count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_tags_all_or_nothing() {
        let tokens = vec!["人物:王隆哲".to_string(), "[类型:开票信息]".to_string()];
        let tags = parse_query_tags(&tokens).unwrap();
        assert_eq!(tags, vec![Tag::new("人物", "王隆哲"), Tag::new("类型", "开票信息")]);

        let bad = vec!["人物:王隆哲".to_string(), "类型".to_string()];
        let err = parse_query_tags(&bad).unwrap_err();
        assert!(err.to_string().contains("类型"));

        assert!(parse_query_tags(&[]).is_err());
    }

    #[test]
    fn test_parse_query_tags_dedupes() {
        let tokens = vec!["a:b".to_string(), "[a:b]".to_string()];
        assert_eq!(parse_query_tags(&tokens).unwrap().len(), 1);
    }

    #[test]
    fn test_format_listing_groups_by_category() {
        let listing = vec![
            TagCount { tag: Tag::new("人物", "刘辉"), count: 3 },
            TagCount { tag: Tag::new("地点", "成都"), count: 2 },
            TagCount { tag: Tag::new("人物", "王隆哲"), count: 1 },
        ];
        assert_eq!(
            format_listing(&listing),
            "【人物】\n  [人物:刘辉]  ×3\n  [人物:王隆哲]  ×1\n\n【地点】\n  [地点:成都]  ×2\n"
        );
    }
}
