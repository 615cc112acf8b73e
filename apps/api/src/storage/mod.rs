//! Persistence adapter: writes a pack under the output root, or hands it back.
//!
//! Writing is all-or-nothing. Every file is first staged inside a temporary
//! directory under the root, then moved into place. If anything fails the
//! moves are undone (overwritten files are restored) and the caller gets the
//! whole pack back as a bundle instead.

use std::io;
use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::generation::models::{FileKind, PackFile};

const STAGING_PREFIX: &str = ".pack-staging-";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("refusing to write outside the output root: {0}")]
    UnsafePath(String),

    #[error("image {path} is not valid base64: {source}")]
    Decode {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// One entry of a bundle-mode response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFile {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&PackFile> for BundleFile {
    fn from(file: &PackFile) -> Self {
        match file.kind {
            FileKind::Text => BundleFile {
                path: file.path.clone(),
                kind: FileKind::Text,
                content: Some(file.content.clone()),
                image_url: None,
            },
            FileKind::Image => BundleFile {
                path: file.path.clone(),
                kind: FileKind::Image,
                content: None,
                image_url: file.image_url.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub enum PersistOutcome {
    Written { paths: Vec<String> },
    Bundle { files: Vec<BundleFile>, reason: String },
}

/// Relative path with only normal components, or `UnsafePath`.
pub fn safe_relative(path: &str) -> Result<PathBuf, StorageError> {
    let candidate = Path::new(path);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(StorageError::UnsafePath(path.to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(StorageError::UnsafePath(path.to_string()));
    }
    Ok(clean)
}

struct PreparedFile {
    relative: PathBuf,
    display: String,
    bytes: Vec<u8>,
}

fn prepare(files: &[PackFile]) -> Result<Vec<PreparedFile>, StorageError> {
    files
        .iter()
        .map(|file| {
            let relative = safe_relative(&file.path)?;
            let bytes = match file.kind {
                FileKind::Text => file.content.clone().into_bytes(),
                FileKind::Image => {
                    BASE64
                        .decode(file.content.as_bytes())
                        .map_err(|source| StorageError::Decode {
                            path: file.path.clone(),
                            source,
                        })?
                }
            };
            Ok(PreparedFile {
                relative,
                display: file.path.clone(),
                bytes,
            })
        })
        .collect()
}

/// A file moved into its final place, with the backup of what it replaced.
struct Moved {
    dest: PathBuf,
    backup: Option<PathBuf>,
}

/// Every change the move phase made under the root.
#[derive(Default)]
struct Journal {
    moved: Vec<Moved>,
    created_dirs: Vec<PathBuf>,
}

async fn rollback(journal: Journal) {
    for entry in journal.moved.into_iter().rev() {
        if let Err(e) = fs::remove_file(&entry.dest).await {
            warn!("rollback could not remove {}: {e}", entry.dest.display());
        }
        if let Some(backup) = entry.backup {
            if let Err(e) = fs::rename(&backup, &entry.dest).await {
                warn!("rollback could not restore {}: {e}", entry.dest.display());
            }
        }
    }

    // Deepest first, so parents are empty by the time they are removed.
    let mut dirs = journal.created_dirs;
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        if let Err(e) = fs::remove_dir(&dir).await {
            warn!("rollback could not remove directory {}: {e}", dir.display());
        }
    }
}

/// `create_dir_all` that records which directories it actually created.
async fn create_dirs(root: &Path, dir: &Path, journal: &mut Journal) -> Result<(), StorageError> {
    let mut missing = Vec::new();
    let mut current = dir;
    while current.starts_with(root) && current != root {
        if fs::try_exists(current).await.unwrap_or(false) {
            break;
        }
        missing.push(current.to_path_buf());
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    let result = fs::create_dir_all(dir).await.map_err(io_err(dir));
    for candidate in missing {
        let created = fs::metadata(&candidate)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if created {
            journal.created_dirs.push(candidate);
        }
    }
    result
}

async fn write_all(root: &Path, files: &[PackFile]) -> Result<Vec<String>, StorageError> {
    let prepared = prepare(files)?;

    fs::create_dir_all(root).await.map_err(io_err(root))?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)
        .map_err(io_err(root))?;
    let staged_root = staging.path().join("files");
    let backup_root = staging.path().join("previous");

    // Stage everything first; nothing under the root changes yet.
    for file in &prepared {
        let staged = staged_root.join(&file.relative);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent).await.map_err(io_err(parent))?;
        }
        fs::write(&staged, &file.bytes).await.map_err(io_err(&staged))?;
    }

    let mut journal = Journal::default();
    for file in &prepared {
        if let Err(e) = move_into_place(root, &staged_root, &backup_root, file, &mut journal).await
        {
            rollback(journal).await;
            return Err(e);
        }
    }

    Ok(prepared.into_iter().map(|f| f.display).collect())
}

async fn move_into_place(
    root: &Path,
    staged_root: &Path,
    backup_root: &Path,
    file: &PreparedFile,
    journal: &mut Journal,
) -> Result<(), StorageError> {
    let dest = root.join(&file.relative);
    if let Some(parent) = dest.parent() {
        create_dirs(root, parent, journal).await?;
    }

    let backup = if fs::try_exists(&dest).await.unwrap_or(false) {
        let backup = backup_root.join(&file.relative);
        if let Some(parent) = backup.parent() {
            fs::create_dir_all(parent).await.map_err(io_err(parent))?;
        }
        fs::rename(&dest, &backup).await.map_err(io_err(&dest))?;
        Some(backup)
    } else {
        None
    };

    let staged = staged_root.join(&file.relative);
    if let Err(source) = fs::rename(&staged, &dest).await {
        if let Some(backup) = &backup {
            if let Err(e) = fs::rename(backup, &dest).await {
                warn!("could not restore {} after failed move: {e}", dest.display());
            }
        }
        return Err(StorageError::Io {
            path: dest.display().to_string(),
            source,
        });
    }

    journal.moved.push(Moved { dest, backup });
    Ok(())
}

/// Writes every file under `root`; on any failure returns the pack as a bundle.
pub async fn persist_pack(root: &Path, files: &[PackFile]) -> PersistOutcome {
    match write_all(root, files).await {
        Ok(paths) => {
            info!("wrote {} pack files under {}", paths.len(), root.display());
            PersistOutcome::Written { paths }
        }
        Err(e) => {
            warn!("local write failed, switching to bundle mode: {e}");
            PersistOutcome::Bundle {
                files: files.iter().map(BundleFile::from).collect(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<PackFile> {
        vec![
            PackFile::text("app/blog/week-1/page.html", "<html></html>"),
            PackFile::text("content/week-1/seed.txt", "seed"),
            PackFile::image(
                "public/images/week-1/blog/hero.png",
                BASE64.encode(b"\x89PNG"),
                "https://img.test/hero.png",
            ),
        ]
    }

    fn staging_dirs(root: &Path) -> usize {
        std::fs::read_dir(root)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .count()
    }

    #[test]
    fn test_safe_relative_rejects_escapes() {
        assert!(safe_relative("social/gbp/week-1/day-1.md").is_ok());
        assert_eq!(safe_relative("./a/b.txt").unwrap(), PathBuf::from("a/b.txt"));
        for bad in ["", "/etc/passwd", "../x", "a/../../x", "."] {
            assert!(safe_relative(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_writes_text_and_decoded_images() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = persist_pack(dir.path(), &sample_files()).await;

        let PersistOutcome::Written { paths } = outcome else {
            panic!("expected written outcome");
        };
        assert_eq!(paths.len(), 3);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("content/week-1/seed.txt")).unwrap(),
            "seed"
        );
        assert_eq!(
            std::fs::read(dir.path().join("public/images/week-1/blog/hero.png")).unwrap(),
            b"\x89PNG"
        );
        assert_eq!(staging_dirs(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_rewrite_overwrites_previous_pack() {
        let dir = tempfile::tempdir().unwrap();
        persist_pack(dir.path(), &sample_files()).await;
        let mut files = sample_files();
        files[1] = PackFile::text("content/week-1/seed.txt", "newer seed");
        assert!(matches!(
            persist_pack(dir.path(), &files).await,
            PersistOutcome::Written { .. }
        ));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("content/week-1/seed.txt")).unwrap(),
            "newer seed"
        );
    }

    #[tokio::test]
    async fn test_failure_rolls_back_and_returns_bundle() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where a directory is needed makes the second move fail.
        std::fs::write(dir.path().join("content"), "in the way").unwrap();

        let outcome = persist_pack(dir.path(), &sample_files()).await;
        let PersistOutcome::Bundle { files, .. } = outcome else {
            panic!("expected bundle outcome");
        };

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].content.as_deref(), Some("<html></html>"));
        assert_eq!(files[2].kind, FileKind::Image);
        assert_eq!(files[2].content, None);
        assert_eq!(files[2].image_url.as_deref(), Some("https://img.test/hero.png"));

        assert!(!dir.path().join("app/blog/week-1/page.html").exists());
        assert!(!dir.path().join("app").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("content")).unwrap(),
            "in the way"
        );
        assert_eq!(staging_dirs(dir.path()), 0);
        let entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["content".to_string()]);
    }

    #[tokio::test]
    async fn test_rollback_keeps_directories_that_already_existed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app/blog")).unwrap();
        std::fs::write(dir.path().join("content"), "in the way").unwrap();

        let outcome = persist_pack(dir.path(), &sample_files()).await;
        assert!(matches!(outcome, PersistOutcome::Bundle { .. }));
        assert!(dir.path().join("app/blog").is_dir());
        assert!(!dir.path().join("app/blog/week-1").exists());
    }

    #[tokio::test]
    async fn test_rollback_restores_overwritten_files() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("app/blog/week-1/page.html");
        std::fs::create_dir_all(page.parent().unwrap()).unwrap();
        std::fs::write(&page, "previous").unwrap();
        std::fs::write(dir.path().join("content"), "in the way").unwrap();

        let outcome = persist_pack(dir.path(), &sample_files()).await;
        assert!(matches!(outcome, PersistOutcome::Bundle { .. }));
        assert_eq!(std::fs::read_to_string(&page).unwrap(), "previous");
    }

    #[tokio::test]
    async fn test_unsafe_path_switches_to_bundle_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = sample_files();
        files.push(PackFile::text("../escape.txt", "nope"));

        let outcome = persist_pack(dir.path(), &files).await;
        let PersistOutcome::Bundle { files, reason } = outcome else {
            panic!("expected bundle outcome");
        };
        assert_eq!(files.len(), 4);
        assert!(reason.contains("../escape.txt"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_base64_switches_to_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![PackFile::image("public/x.png", "***".into(), "https://img.test/x")];
        assert!(matches!(
            persist_pack(dir.path(), &files).await,
            PersistOutcome::Bundle { .. }
        ));
    }
}
