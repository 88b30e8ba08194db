//! # Memory Harness
//!
//! Tag search and smart retrieval over a directory of plain-text memory
//! notes.
//!
//! Notes carry inline tags such as `[人物:刘辉]`. `mem tags` answers
//! AND-queries over those tags and lists tag frequencies. `mem retrieve`
//! classifies a free-text question into a category, maps it to scoped
//! directories and files, and ranks the notes found there. `mem archive`
//! moves stale notes into the archive folder, which every search skips.
//!
//! The engine lives in `memory-harness-core` and never touches the
//! filesystem; this crate adds the filesystem provider, configuration and
//! the CLI commands.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`fs_provider`] | Filesystem note provider |
//! | [`tag_search`] | `mem tags` |
//! | [`retrieve`] | `mem retrieve` and `mem classify` |
//! | [`archive`] | `mem archive` |

pub mod archive;
pub mod config;
pub mod fs_provider;
pub mod retrieve;
pub mod tag_search;
