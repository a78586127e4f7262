//! Case Management Use Cases
//!
//! The role check always runs before the lookup (403 before 404).

use std::sync::Arc;

use auth::{Action, Principal};
use chrono::Utc;
use kernel::id::CaseId;
use kernel::page::Page;

use crate::application::config::CasesConfig;
use crate::domain::entity::{Case, CaseDraft, CasePatch};
use crate::domain::repository::CaseRepository;
use crate::error::{CaseError, CaseResult};
use crate::infra::store::DocumentStore;

pub struct ManageCasesUseCase<R>
where
    R: CaseRepository,
{
    repo: Arc<R>,
    store: Arc<DocumentStore>,
    config: Arc<CasesConfig>,
}

impl<R> ManageCasesUseCase<R>
where
    R: CaseRepository,
{
    pub fn new(repo: Arc<R>, store: Arc<DocumentStore>, config: Arc<CasesConfig>) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    pub async fn list(&self, caller: Option<&Principal>, page: Page) -> CaseResult<Vec<Case>> {
        self.config.policy.authorize(caller, Action::ListCases)?;
        self.repo.list_cases(page.normalized()).await
    }

    pub async fn get(&self, caller: Option<&Principal>, id: CaseId) -> CaseResult<Case> {
        self.config.policy.authorize(caller, Action::ReadCase)?;
        self.load(id).await
    }

    pub async fn create(&self, caller: Option<&Principal>, draft: CaseDraft) -> CaseResult<Case> {
        let principal = self.config.policy.require(caller, Action::CreateCase)?;

        let fields = draft.validate()?;
        let case = self.repo.create_case(&fields, Utc::now()).await?;

        tracing::info!(
            case_id = %case.id,
            case_number = %case.fields.case_number,
            user_id = %principal.user_id,
            "Case created"
        );
        Ok(case)
    }

    pub async fn update(
        &self,
        caller: Option<&Principal>,
        id: CaseId,
        patch: CasePatch,
    ) -> CaseResult<Case> {
        self.config.policy.authorize(caller, Action::UpdateCase)?;
        let mut case = self.load(id).await?;

        case.fields.apply(patch)?;
        case.updated_at = Utc::now();
        self.repo.update_case(&case).await?;

        tracing::info!(case_id = %case.id, "Case updated");
        Ok(case)
    }

    /// Remove the case, its document records and its upload directory.
    ///
    /// The records go first. A directory that cannot be removed is left for
    /// startup reconciliation and does not fail the request.
    pub async fn delete(&self, caller: Option<&Principal>, id: CaseId) -> CaseResult<Case> {
        self.config.policy.authorize(caller, Action::DeleteCase)?;
        let case = self.load(id).await?;

        if !self.repo.delete_case(id).await? {
            return Err(CaseError::CaseNotFound);
        }

        if let Err(e) = self.store.remove_case_dir(id).await {
            tracing::warn!(case_id = %id, error = %e, "Case directory left behind");
        }

        tracing::info!(case_id = %id, "Case deleted");
        Ok(case)
    }

    async fn load(&self, id: CaseId) -> CaseResult<Case> {
        self.repo.find_case(id).await?.ok_or(CaseError::CaseNotFound)
    }
}
