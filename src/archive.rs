//! `mem archive`: move stale notes out of the active corpus.
//!
//! For each configured module directory, every active note whose
//! modification time is older than the threshold is copied to
//! `<archive_dir>/<YYYY-MM>/<stem>_<YYYYMMDD>.<ext>` (month of the note's
//! mtime, date of the run) and then removed from the active tree. Notes are
//! never deleted without a copy in the archive.
//!
//! Search does not coordinate with this command. A search running while a
//! note is being moved may miss it; the next search sees it in the archive
//! (and therefore excludes it).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use memory_harness_core::{EntryKind, NoteProvider};

use crate::config::Config;
use crate::fs_provider::FsProvider;

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub threshold_days: i64,
    pub dry_run: bool,
}

/// Per-module counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleReport {
    pub module: String,
    /// False when the module directory does not exist.
    pub found: bool,
    pub total: usize,
    pub archived: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivedNote {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    pub dry_run: bool,
    pub modules: Vec<ModuleReport>,
    pub moved: Vec<ArchivedNote>,
    /// Active notes left in the configured modules afterwards.
    pub remaining_active: usize,
}

impl ArchiveReport {
    pub fn total(&self) -> usize {
        self.modules.iter().map(|m| m.total).sum()
    }

    pub fn archived(&self) -> usize {
        self.modules.iter().map(|m| m.archived).sum()
    }

    pub fn skipped(&self) -> usize {
        self.modules.iter().map(|m| m.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.modules.iter().map(|m| m.failed).sum()
    }
}

/// Archives stale notes as of `now`.
///
/// Failures on a single module or note are logged and counted; only a
/// missing corpus root or an uncreatable archive directory abort the run.
pub fn archive_corpus(
    config: &Config,
    opts: &ArchiveOptions,
    now: DateTime<Local>,
) -> Result<ArchiveReport> {
    let Some(threshold) = Duration::try_days(opts.threshold_days) else {
        bail!("Archive threshold out of range: {} days", opts.threshold_days);
    };
    let provider = FsProvider::from_config(config)?;
    if !provider.root().is_dir() {
        bail!("Corpus root does not exist: {}", provider.root().display());
    }

    let scanner = config.scanner();
    let archive_rel = PathBuf::from(&config.corpus.archive_dir);
    let archive_root = provider.absolute(&archive_rel);
    if !opts.dry_run {
        fs::create_dir_all(&archive_root).with_context(|| {
            format!("Failed to create archive directory: {}", archive_root.display())
        })?;
    }

    let stamp = now.format("%Y%m%d").to_string();
    let mut report = ArchiveReport {
        dry_run: opts.dry_run,
        ..Default::default()
    };

    for module in &config.archive.modules {
        let mut stats = ModuleReport {
            module: module.clone(),
            ..Default::default()
        };
        let module_path = Path::new(module);
        if provider.entry_kind(module_path) != Some(EntryKind::Dir) {
            warn!(module = %module, "module directory missing, skipping");
            report.modules.push(stats);
            continue;
        }
        stats.found = true;

        // collect first: the walk must not observe its own moves
        let notes: Vec<PathBuf> = scanner.notes(&provider, module_path).collect();
        for note in notes {
            stats.total += 1;
            let Some(modified) = provider.modified(&note) else {
                warn!(note = %note.display(), "cannot read modification time, skipping");
                stats.failed += 1;
                continue;
            };
            let modified = modified.with_timezone(&Local);
            if now.signed_duration_since(modified) <= threshold {
                stats.skipped += 1;
                continue;
            }

            let month_dir = archive_rel.join(modified.format("%Y-%m").to_string());
            if opts.dry_run {
                let to = month_dir.join(archived_name(&note, &stamp, scanner.extension()));
                report.moved.push(ArchivedNote { from: note, to });
                stats.archived += 1;
                continue;
            }

            match move_note(&provider, &note, &month_dir, &stamp, scanner.extension()) {
                Ok(to) => {
                    info!(from = %note.display(), to = %to.display(), "archived note");
                    report.moved.push(ArchivedNote { from: note, to });
                    stats.archived += 1;
                }
                Err(e) => {
                    warn!(
                        note = %note.display(),
                        error = %format!("{:#}", e),
                        "failed to archive note"
                    );
                    stats.failed += 1;
                }
            }
        }
        report.modules.push(stats);
    }

    report.remaining_active = config
        .archive
        .modules
        .iter()
        .map(|m| scanner.notes(&provider, Path::new(m)).count())
        .sum();
    Ok(report)
}

fn archived_name(note: &Path, stamp: &str, extension: &str) -> String {
    let stem = note
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}_{}.{}", stem, stamp, extension)
}

/// Copies `note` into `month_dir` under a date-suffixed name, then removes
/// the original. Returns the corpus-relative destination.
fn move_note(
    provider: &FsProvider,
    note: &Path,
    month_dir: &Path,
    stamp: &str,
    extension: &str,
) -> Result<PathBuf> {
    let abs_dir = provider.absolute(month_dir);
    fs::create_dir_all(&abs_dir)
        .with_context(|| format!("Failed to create {}", abs_dir.display()))?;

    let mut name = archived_name(note, stamp, extension);
    let mut n = 1;
    while abs_dir.join(&name).exists() {
        let stem = note
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        name = format!("{}_{}_{}.{}", stem, stamp, n, extension);
        n += 1;
    }

    let src = provider.absolute(note);
    let dst = abs_dir.join(&name);
    fs::copy(&src, &dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    fs::remove_file(&src).with_context(|| format!("Failed to remove {}", src.display()))?;
    Ok(month_dir.join(name))
}

pub fn run_archive(
    config: &Config,
    threshold_days: Option<i64>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let threshold_days = threshold_days.unwrap_or(config.archive.threshold_days);
    if threshold_days < 1 {
        bail!("--threshold-days must be >= 1");
    }
    let opts = ArchiveOptions {
        threshold_days,
        dry_run,
    };
    let report = archive_corpus(config, &opts, Local::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let archive_root = config.corpus.root.join(&config.corpus.archive_dir);
    if dry_run {
        println!("Dry run: no files will be moved.");
    }
    println!("Archive threshold: {} days", threshold_days);
    println!("Archive directory: {}", archive_root.display());
    println!();

    for m in &report.modules {
        if m.found {
            println!(
                "  {:<16} {} archived, {} skipped, {} failed ({} total)",
                m.module, m.archived, m.skipped, m.failed, m.total
            );
        } else {
            println!("  {:<16} missing, skipped", m.module);
        }
    }
    for moved in &report.moved {
        println!("    {} -> {}", moved.from.display(), moved.to.display());
    }

    println!();
    println!(
        "Totals: {} notes, {} archived, {} skipped, {} failed",
        report.total(),
        report.archived(),
        report.skipped(),
        report.failed()
    );
    println!("Active notes remaining: {}", report.remaining_active);
    Ok(())
}
