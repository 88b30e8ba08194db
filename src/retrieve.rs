//! `mem retrieve` and `mem classify`: route a free-text query to notes.

use anyhow::Result;

use memory_harness_core::Category;

use crate::config::Config;
use crate::fs_provider::FsProvider;

pub fn run_retrieve(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let retriever = config.retriever()?;
    let provider = FsProvider::from_config(config)?;
    let top_k = limit.unwrap_or(config.retrieval.top_k);

    let result = match category {
        // unknown names fall back to the default scopes
        Some(name) => {
            let category = name.parse().unwrap_or(Category::Default);
            retriever.retrieve_as(&provider, query, category, top_k)
        }
        None => retriever.retrieve(&provider, query, top_k),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Query: {}", query);
    println!("Category: {}", result.category);

    if result.candidates.is_empty() {
        println!("No relevant notes.");
        return Ok(());
    }

    println!("Relevant notes (top {}):", result.candidates.len());
    for candidate in &result.candidates {
        println!("  [{:.2}] {}", candidate.score, candidate.path.display());
    }
    Ok(())
}

pub fn run_classify(config: &Config, query: &str) -> Result<()> {
    let classifier = config.classifier()?;
    println!("{}", classifier.classify(query));
    Ok(())
}
