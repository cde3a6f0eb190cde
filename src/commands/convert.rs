use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::journal::config::load_config;
use crate::journal::convert::{ConversionOptions, run_conversion};
use crate::journal::paths::resolve_paths;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub config_path: Option<PathBuf>,
    pub keep_existing: bool,
}

pub fn run(opts: &ConvertOptions) -> Result<CommandReport> {
    let cfg = load_config(opts.config_path.as_deref())?;
    let paths = resolve_paths(&cfg);
    let mut report = CommandReport::new("convert");

    report.detail(format!("export_file={}", paths.export_file.display()));
    report.detail(format!("journal_dir={}", paths.journal_dir.display()));

    let outcome = run_conversion(
        &cfg,
        &ConversionOptions {
            keep_existing: opts.keep_existing,
        },
    )?;

    report.detail(format!("entries={}", outcome.entries));
    report.detail(format!("written={}", outcome.written));
    report.detail(format!("skipped={}", outcome.skipped.len()));
    report.detail(format!("attachments.renamed={}", outcome.renamed));
    report.detail(format!(
        "attachments.already_renamed={}",
        outcome.already_renamed
    ));
    report.detail(format!("attachments.missing={}", outcome.missing_artifacts));
    report.detail(format!("index.photos={}", outcome.indexed_photos));
    report.detail(format!("index.pdfs={}", outcome.indexed_pdfs));
    report.detail(format!("references.resolved={}", outcome.resolved_references));
    report.detail(format!(
        "references.unresolved={}",
        outcome.unresolved_references
    ));
    for skipped in &outcome.skipped {
        report.detail(format!("skipped entry {skipped}"));
    }

    Ok(report)
}
