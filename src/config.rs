//! TOML configuration parsing and validation.
//!
//! Every section is optional; a missing file section falls back to the
//! built-in defaults, so the smallest useful config is just
//! `[corpus] root = "..."`.
//!
//! ```toml
//! [corpus]
//! root = "./memory"
//! extension = "md"
//! archive_dir = "archived"
//! exclude_globs = ["**/drafts/**"]
//!
//! [retrieval]
//! top_k = 5
//! known_names = ["刘辉"]
//! pet_names = ["悠悠", "yoyo"]
//!
//! [scopes]
//! food = ["food/", "current/food/"]
//!
//! [archive]
//! threshold_days = 180
//! modules = ["current", "food", "training", "misc"]
//!
//! [[classifier.rules]]
//! category = "food"
//! patterns = ["午饭|晚饭"]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use memory_harness_core::classify::{add_entity_names, ClassifierRule};
use memory_harness_core::scan::{DEFAULT_ARCHIVE_DIR, DEFAULT_NOTE_EXTENSION};
use memory_harness_core::score::DEFAULT_PET_NAMES;
use memory_harness_core::{
    Category, CorpusScanner, EntityMatcher, QueryClassifier, RelevanceScorer, Retriever,
    ScopePath, ScopeResolver,
};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Per-category scope overrides, keyed by category name.
    #[serde(default)]
    pub scopes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            archive_dir: default_archive_dir(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./memory")
}
fn default_extension() -> String {
    DEFAULT_NOTE_EXTENSION.to_string()
}
fn default_archive_dir() -> String {
    DEFAULT_ARCHIVE_DIR.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Person names recognised in queries. These also route a query to
    /// the relation category.
    #[serde(default)]
    pub known_names: Vec<String>,
    /// Pet names boosted in relation and pet lookups.
    #[serde(default = "default_pet_names")]
    pub pet_names: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            known_names: Vec::new(),
            pet_names: default_pet_names(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_pet_names() -> Vec<String> {
    DEFAULT_PET_NAMES.iter().map(|n| n.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_threshold_days")]
    pub threshold_days: i64,
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
            modules: default_modules(),
        }
    }
}

fn default_threshold_days() -> i64 {
    180
}
fn default_modules() -> Vec<String> {
    ["current", "food", "training", "misc"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    /// Replaces the built-in rules when non-empty. Order is priority.
    #[serde(default)]
    pub rules: Vec<ClassifierRule>,
}

impl Config {
    /// Built-in defaults rooted at `root`.
    pub fn minimal(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.corpus.root = root.into();
        config
    }

    pub fn scanner(&self) -> CorpusScanner {
        CorpusScanner::new(&self.corpus.extension, &self.corpus.archive_dir)
    }

    pub fn classifier(&self) -> Result<QueryClassifier> {
        let mut rules = if self.classifier.rules.is_empty() {
            ClassifierRule::defaults()
        } else {
            self.classifier.rules.clone()
        };
        add_entity_names(&mut rules, &self.retrieval.known_names);
        QueryClassifier::new(&rules).context("Failed to build query classifier")
    }

    pub fn scope_resolver(&self) -> Result<ScopeResolver> {
        let mut resolver = ScopeResolver::with_defaults();
        for (name, entries) in &self.scopes {
            let category: Category = name
                .parse()
                .with_context(|| format!("Invalid [scopes] key '{}'", name))?;
            let scopes = entries
                .iter()
                .map(|e| ScopePath::parse(e, &self.corpus.extension))
                .collect();
            resolver.set(category, scopes);
        }
        Ok(resolver)
    }

    pub fn retriever(&self) -> Result<Retriever> {
        let names: Vec<String> = self
            .retrieval
            .known_names
            .iter()
            .chain(&self.retrieval.pet_names)
            .cloned()
            .collect();
        let scorer = RelevanceScorer::new(self.scanner(), EntityMatcher::new(&names));
        Ok(Retriever::new(
            self.classifier()?,
            self.scope_resolver()?,
            scorer,
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.corpus.extension.trim().is_empty() || self.corpus.extension.contains('.') {
            bail!("corpus.extension must be a bare extension such as \"md\"");
        }
        if self.corpus.archive_dir.trim().is_empty()
            || self.corpus.archive_dir.contains(['/', '\\'])
        {
            bail!("corpus.archive_dir must be a single directory name");
        }
        if self.retrieval.top_k < 1 {
            bail!("retrieval.top_k must be >= 1");
        }
        if self.archive.threshold_days < 1
            || chrono::Duration::try_days(self.archive.threshold_days).is_none()
        {
            bail!("archive.threshold_days must be between 1 and {} days", i64::MAX / 86_400_000);
        }
        self.scope_resolver()?;
        self.classifier()?;
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Loads `path`, or falls back to [`Config::minimal`] when `root` is given
/// and the file does not exist. `root` always overrides `corpus.root`.
pub fn resolve_config(path: &Path, root: Option<&Path>) -> Result<Config> {
    let mut config = match root {
        Some(root) if !path.exists() => {
            let config = Config::minimal(root);
            config.validate()?;
            config
        }
        _ => load_config(path)?,
    };
    if let Some(root) = root {
        config.corpus.root = root.to_path_buf();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mem.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let (_tmp, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.corpus.root, PathBuf::from("./memory"));
        assert_eq!(cfg.corpus.extension, "md");
        assert_eq!(cfg.corpus.archive_dir, "archived");
        assert_eq!(cfg.retrieval.top_k, 5);
        assert_eq!(cfg.archive.threshold_days, 180);
        assert_eq!(cfg.archive.modules, vec!["current", "food", "training", "misc"]);
    }

    #[test]
    fn test_scope_overrides() {
        let (_tmp, path) = write_config(
            r#"
[scopes]
food = ["kitchen/", "menu.md"]
"#,
        );
        let cfg = load_config(&path).unwrap();
        let resolver = cfg.scope_resolver().unwrap();
        assert_eq!(
            resolver.resolve(Category::Food),
            &[ScopePath::dir("kitchen"), ScopePath::file("menu.md")]
        );
        assert_eq!(resolver.resolve(Category::System), &[ScopePath::dir("system")]);
    }

    #[test]
    fn test_unknown_scope_key_rejected() {
        let (_tmp, path) = write_config("[scopes]\nweather = [\"sky/\"]\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("weather"));
    }

    #[test]
    fn test_classifier_rules_override_in_order() {
        let (_tmp, path) = write_config(
            r#"
[[classifier.rules]]
category = "system"
patterns = ["deploy"]

[[classifier.rules]]
category = "project"
patterns = ["deploy|release"]
"#,
        );
        let cfg = load_config(&path).unwrap();
        let classifier = cfg.classifier().unwrap();
        assert_eq!(classifier.classify("deploy now"), Category::System);
        assert_eq!(classifier.classify("release notes"), Category::Project);
        assert_eq!(classifier.classify("午饭"), Category::Default);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let (_tmp, path) = write_config(
            "[[classifier.rules]]\ncategory = \"mood\"\npatterns = [\"(\"]\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_known_names_feed_classifier() {
        let (_tmp, path) = write_config("[retrieval]\nknown_names = [\"Ada\"]\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.classifier().unwrap().classify("what did ada say"), Category::Relation);
    }

    #[test]
    fn test_default_pet_names_rank_named_pet_first() {
        let tmp = TempDir::new().unwrap();
        let pets = tmp.path().join("relations/pets");
        fs::create_dir_all(&pets).unwrap();
        fs::write(pets.join("悠悠.md"), "dog").unwrap();
        fs::write(pets.join("豆豆.md"), "cat").unwrap();

        let cfg = Config::minimal(tmp.path());
        assert_eq!(cfg.retrieval.pet_names, vec!["悠悠", "yoyo"]);
        let provider = crate::fs_provider::FsProvider::from_config(&cfg).unwrap();
        let result = cfg.retriever().unwrap().retrieve(&provider, "悠悠今天乖不乖", 5);
        assert_eq!(result.category, Category::Pet);
        assert_eq!(result.candidates[0].path, PathBuf::from("relations/pets/悠悠.md"));
        assert_eq!(result.candidates[0].score, 1.0);
        assert_eq!(result.candidates[1].score, 0.8);
    }

    #[test]
    fn test_validation() {
        for bad in [
            "[retrieval]\ntop_k = 0\n",
            "[archive]\nthreshold_days = 0\n",
            "[archive]\nthreshold_days = 9223372036854775807\n",
            "[corpus]\nextension = \".md\"\n",
            "[corpus]\narchive_dir = \"a/b\"\n",
        ] {
            let (_tmp, path) = write_config(bad);
            assert!(load_config(&path).is_err(), "accepted: {}", bad);
        }
    }

    #[test]
    fn test_resolve_config_with_root_and_no_file() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.toml");
        let cfg = resolve_config(&missing, Some(tmp.path())).unwrap();
        assert_eq!(cfg.corpus.root, tmp.path());
        assert!(resolve_config(&missing, None).is_err());
    }
}
