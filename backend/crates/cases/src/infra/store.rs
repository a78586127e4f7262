//! Document File Store
//!
//! Layout under the upload root:
//!
//! ```text
//! <root>/<case_id>/<%Y%m%d_%H%M%S>_<case_id>_<name>   committed file
//! <root>/<case_id>/.<uuid>.part                       upload in progress
//! ```
//!
//! Every path is built here from a case id and a sanitized name; stored keys
//! are re-checked against the root before any file-system call.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use kernel::id::CaseId;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CaseError, CaseResult};

const TEMP_SUFFIX: &str = ".part";
const FALLBACK_NAME: &str = "document";
const MAX_NAME_LENGTH: usize = 120;

/// Reduce a client file name to a safe single path component.
///
/// Keeps the last component only, then `[A-Za-z0-9._-]`; leading dots are
/// dropped so the result is never hidden and never `.` or `..`.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.trim_matches('_').is_empty() {
        return FALLBACK_NAME.to_string();
    }

    cleaned.chars().take(MAX_NAME_LENGTH).collect()
}

/// Verify that a stored key resolves inside the root.
fn ensure_within(root: &Path, key: &str) -> CaseResult<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            _ => {
                return Err(CaseError::Internal(format!(
                    "stored path escapes upload root: {key}"
                )));
            }
        }
    }
    if resolved == root {
        return Err(CaseError::Internal("empty stored path".into()));
    }
    Ok(resolved)
}

/// A fully written upload not yet visible under its final name
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub async fn new(root: PathBuf) -> CaseResult<Self> {
        fs::create_dir_all(&root).await?;
        let root = fs::canonicalize(&root).await?;

        info!(path = %root.display(), "Document store initialized");

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn case_dir(&self, case_id: CaseId) -> PathBuf {
        self.root.join(case_id.to_string())
    }

    /// Absolute path for a stored key
    pub fn resolve(&self, key: &str) -> CaseResult<PathBuf> {
        ensure_within(&self.root, key)
    }

    /// Write bytes to a fresh temp file in the case directory.
    ///
    /// The temp file is removed again if the write fails.
    pub async fn write_temp(&self, case_id: CaseId, data: &[u8]) -> CaseResult<TempFile> {
        let dir = self.case_dir(case_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4()));
        let temp = TempFile { path };

        let written = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp.path)
                .await?;
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            self.discard(temp).await;
            return Err(e.into());
        }

        debug!(path = %temp.path.display(), size = data.len(), "Upload staged");
        Ok(temp)
    }

    /// Pick a key `<case_id>/<stamp>_<case_id>_<name>` that is free on disk.
    ///
    /// `attempt` > 0 inserts a counter before the extension; callers bump it
    /// when the database reports the key as taken.
    pub async fn free_key(
        &self,
        case_id: CaseId,
        name: &str,
        at: DateTime<Utc>,
        mut attempt: u32,
    ) -> CaseResult<String> {
        const MAX_PROBES: u32 = 64;

        let stamp = at.format("%Y%m%d_%H%M%S");
        let (stem, ext) = match name.rfind('.') {
            Some(i) if i > 0 => name.split_at(i),
            _ => (name, ""),
        };

        for _ in 0..MAX_PROBES {
            let file_name = if attempt == 0 {
                format!("{stamp}_{case_id}_{name}")
            } else {
                format!("{stamp}_{case_id}_{stem}_{attempt}{ext}")
            };
            let key = format!("{case_id}/{file_name}");

            if !fs::try_exists(self.resolve(&key)?).await? {
                return Ok(key);
            }
            attempt += 1;
        }

        Err(CaseError::PathTaken)
    }

    /// Move a staged upload to its final key
    pub async fn commit(&self, temp: &TempFile, key: &str) -> CaseResult<()> {
        let target = self.resolve(key)?;
        fs::rename(&temp.path, &target).await?;
        debug!(key, "Upload committed");
        Ok(())
    }

    /// Best-effort removal of a staged upload
    pub async fn discard(&self, temp: TempFile) {
        match fs::remove_file(&temp.path).await {
            Ok(()) => debug!(path = %temp.path.display(), "Staged upload discarded"),
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %temp.path.display(),
                error = %e,
                "Failed to discard staged upload"
            ),
        }
    }

    pub async fn read(&self, key: &str) -> CaseResult<Vec<u8>> {
        let data = fs::read(self.resolve(key)?).await?;
        debug!(key, size = data.len(), "Document read");
        Ok(data)
    }

    /// Delete a committed file. A file that is already gone counts as deleted.
    pub async fn remove(&self, key: &str) -> CaseResult<()> {
        match fs::remove_file(self.resolve(key)?).await {
            Ok(()) => {
                debug!(key, "Document file removed");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a case directory and everything in it
    pub async fn remove_case_dir(&self, case_id: CaseId) -> CaseResult<()> {
        match fs::remove_dir_all(self.case_dir(case_id)).await {
            Ok(()) => {
                debug!(case_id = %case_id, "Case directory removed");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Case ids that have a directory under the root.
    /// Entries that are not numeric directories are ignored.
    pub async fn case_dirs(&self) -> CaseResult<Vec<CaseId>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<i64>().ok())
            {
                ids.push(CaseId::from_i64(id));
            }
        }

        ids.sort_by_key(|id| id.as_i64());
        Ok(ids)
    }

    /// Remove leftover `.part` files. Only safe while no upload is running.
    pub async fn remove_stale_temp_files(&self) -> CaseResult<usize> {
        let mut removed = 0;

        for case_id in self.case_dirs().await? {
            let mut entries = fs::read_dir(self.case_dir(case_id)).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    continue;
                };
                if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
                    self.discard(TempFile { path: entry.path() }).await;
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}
