use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::VaultError;
use crate::journal::attachments::AttachmentFamily;
use crate::journal::config::VaultConfig;

pub const LOCK_FILE_NAME: &str = ".dayone-vault.lock";

#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub root: PathBuf,
    pub journal_dir: PathBuf,
    pub export_file: PathBuf,
    pub photos_dir: PathBuf,
    pub pdfs_dir: PathBuf,
    pub lock_file: PathBuf,
}

fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl VaultPaths {
    pub fn family_dir(&self, family: AttachmentFamily) -> &Path {
        match family {
            AttachmentFamily::Photo => &self.photos_dir,
            AttachmentFamily::Pdf => &self.pdfs_dir,
        }
    }
}

pub fn resolve_paths(cfg: &VaultConfig) -> VaultPaths {
    let root = cfg.journal.root.clone();
    VaultPaths {
        journal_dir: under_root(&root, &cfg.journal.journal_folder),
        export_file: under_root(&root, &cfg.journal.journal_json),
        photos_dir: root.join(AttachmentFamily::Photo.subfolder()),
        pdfs_dir: root.join(AttachmentFamily::Pdf.subfolder()),
        lock_file: root.join(LOCK_FILE_NAME),
        root,
    }
}

/// Lexical absolute form: `.` dropped, `..` pops. Symlinks are not followed.
fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn check_layout_from(paths: &VaultPaths, cwd: &Path) -> Result<(), VaultError> {
    let journal = normalize(&paths.journal_dir, cwd);
    for (what, path) in [
        ("vault root", &paths.root),
        ("photos folder", &paths.photos_dir),
        ("pdfs folder", &paths.pdfs_dir),
        ("export file", &paths.export_file),
    ] {
        if normalize(path, cwd).starts_with(&journal) {
            return Err(VaultError::InvalidConfig(format!(
                "journal folder {} would contain the {what} {}",
                paths.journal_dir.display(),
                path.display()
            )));
        }
    }
    Ok(())
}

/// The journal folder is wiped before each run, so it must not be or hold
/// the vault root, an attachment folder, or the export.
pub fn check_layout(paths: &VaultPaths) -> Result<(), VaultError> {
    let cwd = env::current_dir().map_err(|err| {
        VaultError::InvalidConfig(format!("cannot resolve current directory: {err}"))
    })?;
    check_layout_from(paths, &cwd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(root: &str, folder: &str, json: &str) -> VaultPaths {
        let mut cfg = VaultConfig::default();
        cfg.journal.root = PathBuf::from(root);
        cfg.journal.journal_folder = PathBuf::from(folder);
        cfg.journal.journal_json = PathBuf::from(json);
        resolve_paths(&cfg)
    }

    fn rejected(paths: &VaultPaths) -> String {
        match check_layout_from(paths, Path::new("/work")) {
            Err(VaultError::InvalidConfig(msg)) => msg,
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_layout_passes() {
        let paths = layout("/vault", "Journal", "Journal.json");
        assert!(check_layout_from(&paths, Path::new("/work")).is_ok());
        let nested = layout("/vault", "notes/Journal", "exports/Journal.json");
        assert!(check_layout_from(&nested, Path::new("/work")).is_ok());
    }

    #[test]
    fn attachment_folders_cannot_be_the_journal() {
        assert!(rejected(&layout("/vault", "photos", "Journal.json")).contains("photos folder"));
        assert!(rejected(&layout("/vault", "pdfs", "Journal.json")).contains("pdfs folder"));
        assert!(
            rejected(&layout("/vault", "Journal/../photos", "Journal.json"))
                .contains("photos folder")
        );
    }

    #[test]
    fn root_itself_or_a_parent_cannot_be_the_journal() {
        assert!(rejected(&layout("/vault", "/vault", "Journal.json")).contains("vault root"));
        assert!(rejected(&layout("/vault", "/vault/", "Journal.json")).contains("vault root"));
        assert!(rejected(&layout("/vault", "..", "Journal.json")).contains("vault root"));
        assert!(rejected(&layout("/vault", "Journal/..", "Journal.json")).contains("vault root"));
        assert!(rejected(&layout("/vault/sub", "/", "Journal.json")).contains("vault root"));
    }

    #[test]
    fn relative_root_is_resolved_against_cwd() {
        assert!(rejected(&layout(".", "/work", "Journal.json")).contains("vault root"));
        assert!(rejected(&layout("vault", "/work/vault/./photos", "x.json")).contains("photos"));
    }

    #[test]
    fn export_inside_journal_folder_is_rejected() {
        let msg = rejected(&layout("/vault", "Journal", "Journal/Journal.json"));
        assert!(msg.contains("export file"));
    }

    #[test]
    fn relative_entries_land_under_root() {
        let mut cfg = VaultConfig::default();
        cfg.journal.root = PathBuf::from("/vault");
        cfg.journal.journal_json = PathBuf::from("/exports/Journal.json");

        let paths = resolve_paths(&cfg);
        assert_eq!(paths.journal_dir, PathBuf::from("/vault/Journal"));
        assert_eq!(paths.export_file, PathBuf::from("/exports/Journal.json"));
        assert_eq!(paths.family_dir(AttachmentFamily::Photo), Path::new("/vault/photos"));
        assert_eq!(paths.family_dir(AttachmentFamily::Pdf), Path::new("/vault/pdfs"));
    }
}
