use anyhow::{Context, Result};
use fs2::FileExt;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::VaultError;
use crate::journal::attachments::{Attachment, AttachmentFamily, AttachmentResolver};
use crate::journal::config::VaultConfig;
use crate::journal::dates::{calendar_date, localize};
use crate::journal::document::{clean_text, render_document};
use crate::journal::export::{Entry, parse_entries};
use crate::journal::media::{RenameOutcome, ensure_safe_names, rename_if_present};
use crate::journal::output::OutputAllocator;
use crate::journal::paths::{VaultPaths, check_layout, resolve_paths};

#[derive(Debug, Clone, Default)]
pub struct ConversionOutcome {
    pub entries: usize,
    pub written: usize,
    pub skipped: Vec<String>,
    pub renamed: usize,
    pub already_renamed: usize,
    pub missing_artifacts: usize,
    pub resolved_references: usize,
    pub unresolved_references: usize,
    pub indexed_photos: usize,
    pub indexed_pdfs: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Leave the journal folder in place instead of wiping it first.
    pub keep_existing: bool,
}

/// Holds the per-run state: one resolver per family and the allocator.
pub struct Converter {
    paths: VaultPaths,
    default_text: String,
    photos: AttachmentResolver,
    pdfs: AttachmentResolver,
    allocator: OutputAllocator,
    outcome: ConversionOutcome,
}

impl Converter {
    pub fn new(paths: VaultPaths, default_text: impl Into<String>) -> Self {
        let allocator = OutputAllocator::new(paths.journal_dir.clone());
        Self {
            paths,
            default_text: default_text.into(),
            photos: AttachmentResolver::new(AttachmentFamily::Photo),
            pdfs: AttachmentResolver::new(AttachmentFamily::Pdf),
            allocator,
            outcome: ConversionOutcome::default(),
        }
    }

    fn resolver_mut(&mut self, family: AttachmentFamily) -> &mut AttachmentResolver {
        match family {
            AttachmentFamily::Photo => &mut self.photos,
            AttachmentFamily::Pdf => &mut self.pdfs,
        }
    }

    fn register_attachments(&mut self, entry: &Entry) -> Result<()> {
        for family in AttachmentFamily::ALL {
            for media in entry.media(family) {
                let attachment = Attachment::from(media);
                let outcome = rename_if_present(
                    &self.paths.root,
                    family.subfolder(),
                    &attachment,
                    &attachment.file_extension,
                )?;
                match outcome {
                    RenameOutcome::Renamed => self.outcome.renamed += 1,
                    RenameOutcome::AlreadyRenamed => self.outcome.already_renamed += 1,
                    RenameOutcome::Missing => self.outcome.missing_artifacts += 1,
                }
                self.resolver_mut(family).register(attachment);
            }
        }
        Ok(())
    }

    fn rewrite_body(&mut self, entry: &Entry, label: &str) -> String {
        let raw = entry.text.as_deref().unwrap_or(self.default_text.as_str());
        let mut text = clean_text(raw);
        for resolver in [&self.photos, &self.pdfs] {
            let rewrite = resolver.rewrite(&text);
            for id in &rewrite.unresolved {
                warn!(
                    entry = %label,
                    identifier = %id,
                    "unresolved {} reference",
                    resolver.family().label()
                );
            }
            self.outcome.resolved_references += rewrite.resolved;
            self.outcome.unresolved_references += rewrite.unresolved.len();
            text = rewrite.text;
        }
        text
    }

    /// Convert one raw record.
    ///
    /// The outer `Result` carries fatal errors (rename, allocation, write).
    /// `Ok(None)` means the entry itself was unusable and has been recorded
    /// as skipped.
    pub fn convert_entry(&mut self, index: usize, raw: &Value) -> Result<Option<PathBuf>> {
        self.outcome.entries += 1;

        let decoded = Entry::from_value(index, raw)
            .map_err(anyhow::Error::from)
            .and_then(|entry| {
                for family in AttachmentFamily::ALL {
                    for media in entry.media(family) {
                        ensure_safe_names(&Attachment::from(media), &media.file_type)
                            .with_context(|| format!("entry {}", entry.label(index)))?;
                    }
                }
                let local = localize(&entry.creation_date, entry.time_zone.as_deref())
                    .with_context(|| format!("entry {}", entry.label(index)))?;
                Ok((entry, local))
            });
        let (entry, local) = match decoded {
            Ok(pair) => pair,
            Err(err) => {
                error!("skipping entry #{index}: {err:#}");
                self.outcome.skipped.push(format!("#{index}: {err:#}"));
                return Ok(None);
            }
        };
        let label = entry.label(index);

        self.register_attachments(&entry)?;
        let body = self.rewrite_body(&entry, &label);
        let document = render_document(&entry, &local, &body);

        let path = self.allocator.allocate(calendar_date(&local))?;
        fs::write(&path, document)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(entry = %label, path = %path.display(), "entry written");

        self.outcome.written += 1;
        Ok(Some(path))
    }

    pub fn finish(mut self) -> ConversionOutcome {
        self.outcome.indexed_photos = self.photos.index().len();
        self.outcome.indexed_pdfs = self.pdfs.index().len();
        self.outcome
    }
}

fn acquire_lock(paths: &VaultPaths) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_file)
        .with_context(|| format!("failed to open {}", paths.lock_file.display()))?;
    file.try_lock_exclusive()
        .map_err(|_| VaultError::Locked(paths.lock_file.display().to_string()))?;
    Ok(file)
}

fn prepare_journal_dir(dir: &Path, clean: bool) -> Result<()> {
    if clean && dir.is_dir() {
        info!("Deleting existing folder: {}", dir.display());
        fs::remove_dir_all(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    if !dir.is_dir() {
        info!("Creating journal folder: {}", dir.display());
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// One exclusive pass over the export. Files written before a fatal error
/// stay on disk.
pub fn run_conversion(cfg: &VaultConfig, opts: &ConversionOptions) -> Result<ConversionOutcome> {
    let paths = resolve_paths(cfg);
    if !paths.root.is_dir() {
        anyhow::bail!("vault root {} is not a directory", paths.root.display());
    }
    check_layout(&paths)?;
    let _lock = acquire_lock(&paths)?;

    let raw = fs::read_to_string(&paths.export_file)
        .with_context(|| format!("failed to read {}", paths.export_file.display()))?;
    let entries = parse_entries(&raw)?;

    prepare_journal_dir(&paths.journal_dir, cfg.journal.clean_output && !opts.keep_existing)?;

    info!("Begin processing {} entries", entries.len());
    let mut converter = Converter::new(paths, cfg.journal.default_text.clone());
    for (index, entry) in entries.iter().enumerate() {
        converter.convert_entry(index, entry)?;
    }

    let outcome = converter.finish();
    info!(
        "Complete: {} entries processed, {} written, {} skipped",
        outcome.entries,
        outcome.written,
        outcome.skipped.len()
    );
    Ok(outcome)
}
