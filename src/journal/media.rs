use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::VaultError;
use crate::journal::attachments::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// Hash-named file gone, identifier-named file present.
    AlreadyRenamed,
    /// Neither name exists on disk.
    Missing,
}

fn ensure_plain_name(value: &str) -> Result<(), VaultError> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || value.contains("..")
    {
        return Err(VaultError::UnsafeAttachmentName(value.to_string()));
    }
    Ok(())
}

/// Identifier, md5 and type become file names inside the family folder, so
/// none of them may carry a path separator or `..`.
pub fn ensure_safe_names(attachment: &Attachment, extension: &str) -> Result<(), VaultError> {
    ensure_plain_name(&attachment.identifier)?;
    ensure_plain_name(&attachment.content_hash)?;
    ensure_plain_name(extension)
}

/// Move `root/subfolder/<md5>.<ext>` to `root/subfolder/<identifier>.<ext>`.
///
/// An absent hash-named file is the steady state after the first run and
/// is not an error. A failing rename is, since text already points at the
/// identifier name.
pub fn rename_if_present(
    root: &Path,
    subfolder: &str,
    attachment: &Attachment,
    extension: &str,
) -> Result<RenameOutcome> {
    ensure_safe_names(attachment, extension)?;
    let dir = root.join(subfolder);
    let from = dir.join(format!("{}.{extension}", attachment.content_hash));
    let to = dir.join(format!("{}.{extension}", attachment.identifier));

    if from == to || !from.is_file() {
        if to.is_file() {
            return Ok(RenameOutcome::AlreadyRenamed);
        }
        debug!(
            identifier = %attachment.identifier,
            path = %from.display(),
            "attachment file not found"
        );
        return Ok(RenameOutcome::Missing);
    }

    fs::rename(&from, &to)
        .with_context(|| format!("failed to rename {} to {}", from.display(), to.display()))?;
    info!("Renaming {} to {}", from.display(), to.display());
    Ok(RenameOutcome::Renamed)
}
