//! Attachment index and placeholder rewriting.
//!
//! Day One writes attachment references into entry text by identifier
//! (`![](dayone-moment://<HEX>)`), while the files on disk start out named by
//! their md5. Each family keeps one index for the whole run, since a
//! placeholder may point at an attachment first seen in an earlier entry.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::journal::export::MediaRef;

static PHOTO_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static PDF_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentFamily {
    Photo,
    Pdf,
}

impl AttachmentFamily {
    /// Processing order within an entry.
    pub const ALL: [AttachmentFamily; 2] = [AttachmentFamily::Photo, AttachmentFamily::Pdf];

    pub fn subfolder(self) -> &'static str {
        match self {
            Self::Photo => "photos",
            Self::Pdf => "pdfs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Pdf => "pdf",
        }
    }

    /// Placeholder syntax; the identifier is captured as `id`.
    pub fn placeholder_pattern(self) -> &'static Regex {
        match self {
            Self::Photo => PHOTO_PLACEHOLDER_RE.get_or_init(|| {
                Regex::new(r"!\[\]\(dayone-moment://(?P<id>[A-F0-9]+)\)")
                    .expect("photo placeholder pattern is valid")
            }),
            Self::Pdf => PDF_PLACEHOLDER_RE.get_or_init(|| {
                Regex::new(r"!\[\]\(dayone-moment:/pdfAttachment/(?P<id>[A-F0-9]+)\)")
                    .expect("pdf placeholder pattern is valid")
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub identifier: String,
    pub content_hash: String,
    pub file_extension: String,
}

impl Attachment {
    pub fn stable_file_name(&self) -> String {
        format!("{}.{}", self.identifier, self.file_extension)
    }
}

impl From<&MediaRef> for Attachment {
    fn from(media: &MediaRef) -> Self {
        Self {
            identifier: media.identifier.clone(),
            content_hash: media.md5.clone(),
            file_extension: media.file_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentIndex {
    by_identifier: HashMap<String, Attachment>,
}

impl AttachmentIndex {
    /// Last write for an identifier wins.
    pub fn register(&mut self, attachment: Attachment) {
        self.by_identifier
            .insert(attachment.identifier.clone(), attachment);
    }

    pub fn get(&self, identifier: &str) -> Option<&Attachment> {
        self.by_identifier.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved(String),
}

impl Resolution {
    pub fn into_markup(self) -> String {
        match self {
            Self::Resolved(markup) | Self::Unresolved(markup) => markup,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Result of rewriting one text: the new text plus the identifiers that
/// could not be resolved, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub resolved: usize,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AttachmentResolver {
    family: AttachmentFamily,
    index: AttachmentIndex,
}

impl AttachmentResolver {
    pub fn new(family: AttachmentFamily) -> Self {
        Self {
            family,
            index: AttachmentIndex::default(),
        }
    }

    pub fn family(&self) -> AttachmentFamily {
        self.family
    }

    pub fn index(&self) -> &AttachmentIndex {
        &self.index
    }

    pub fn register(&mut self, attachment: Attachment) {
        self.index.register(attachment);
    }

    pub fn resolve(&self, identifier: &str) -> Resolution {
        match self.index.get(identifier) {
            Some(attachment) => Resolution::Resolved(format!(
                "![]({}/{})",
                self.family.subfolder(),
                attachment.stable_file_name()
            )),
            None => Resolution::Unresolved(format!(
                "[unresolved {}: {identifier}]",
                self.family.label()
            )),
        }
    }

    pub fn rewrite(&self, text: &str) -> Rewrite {
        let mut resolved = 0usize;
        let mut unresolved = Vec::new();
        let text = rewrite_placeholders(text, self.family.placeholder_pattern(), |id| {
            let resolution = self.resolve(id);
            if resolution.is_resolved() {
                resolved += 1;
            } else {
                unresolved.push(id.to_string());
            }
            resolution.into_markup()
        });
        Rewrite {
            text,
            resolved,
            unresolved,
        }
    }
}

/// Replace every match of `pattern` with `lookup(id)`, left to right. Text
/// outside the matched spans is copied unchanged.
pub fn rewrite_placeholders(
    text: &str,
    pattern: &Regex,
    mut lookup: impl FnMut(&str) -> String,
) -> String {
    pattern
        .replace_all(text, |caps: &Captures| lookup(&caps["id"]))
        .into_owned()
}
