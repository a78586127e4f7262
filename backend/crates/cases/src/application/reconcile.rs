//! Startup Reconciliation
//!
//! Brings the upload tree back in line with the database after a crash or a
//! failed delete:
//!
//! - documents flagged `deletion_pending` get their file deleted again
//! - leftover `.part` files from interrupted uploads are removed
//! - directories of cases that no longer exist are removed
//!
//! Runs before the server accepts requests.

use std::sync::Arc;

use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::error::CaseResult;
use crate::infra::store::DocumentStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub documents_removed: usize,
    pub documents_failed: usize,
    pub temp_files_removed: usize,
    pub case_dirs_removed: usize,
}

pub struct ReconcileStorageUseCase<R>
where
    R: CaseRepository + DocumentRepository,
{
    repo: Arc<R>,
    store: Arc<DocumentStore>,
}

impl<R> ReconcileStorageUseCase<R>
where
    R: CaseRepository + DocumentRepository,
{
    pub fn new(repo: Arc<R>, store: Arc<DocumentStore>) -> Self {
        Self { repo, store }
    }

    pub async fn execute(&self) -> CaseResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for document in self.repo.list_deletion_pending().await? {
            match self.store.remove(&document.file_path).await {
                Ok(()) => {
                    self.repo.delete_document(document.id).await?;
                    report.documents_removed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        document_id = %document.id,
                        key = %document.file_path,
                        error = %e,
                        "Pending document still cannot be deleted"
                    );
                    report.documents_failed += 1;
                }
            }
        }

        report.temp_files_removed = self.store.remove_stale_temp_files().await?;

        for case_id in self.store.case_dirs().await? {
            if self.repo.case_exists(case_id).await? {
                continue;
            }
            match self.store.remove_case_dir(case_id).await {
                Ok(()) => report.case_dirs_removed += 1,
                Err(e) => tracing::warn!(
                    case_id = %case_id,
                    error = %e,
                    "Failed to remove directory of deleted case"
                ),
            }
        }

        Ok(report)
    }
}
