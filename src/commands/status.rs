use anyhow::Result;
use std::env;
use std::fs;
use std::path::Path;

use crate::commands::CommandReport;
use crate::journal::attachments::AttachmentFamily;
use crate::journal::config::{ENV_VARS, load_config};
use crate::journal::paths::{check_layout, resolve_paths};

fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0usize;
    for entry in fs::read_dir(dir)? {
        if entry?.file_type()?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}

pub fn run(config_path: Option<&Path>) -> Result<CommandReport> {
    let cfg = load_config(config_path)?;
    let paths = resolve_paths(&cfg);
    let mut report = CommandReport::new("status");

    match &cfg.source {
        Some(source) => report.detail(format!("config_file={}", source.display())),
        None => report.detail("config_file=none (defaults + environment)"),
    }
    report.detail(format!("root={}", paths.root.display()));
    report.detail(format!("export_file={}", paths.export_file.display()));
    report.detail(format!("journal_dir={}", paths.journal_dir.display()));
    report.detail(format!("clean_output={}", cfg.journal.clean_output));

    if !paths.root.is_dir() {
        report.issue(format!("missing vault root ({})", paths.root.display()));
    }
    if let Err(err) = check_layout(&paths) {
        report.issue(err.to_string());
    }
    if !paths.export_file.is_file() {
        report.issue(format!(
            "missing export file ({})",
            paths.export_file.display()
        ));
    }

    for family in AttachmentFamily::ALL {
        let dir = paths.family_dir(family);
        if dir.is_dir() {
            report.detail(format!(
                "{}_files={}",
                family.subfolder(),
                count_files(dir)?
            ));
        } else {
            report.detail(format!("{}_dir=missing ({})", family.subfolder(), dir.display()));
        }
    }

    for key in ENV_VARS {
        if env::var_os(key).is_some() {
            report.detail(format!("env.{key}=set"));
        }
    }

    Ok(report)
}
