//! SQLite Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::{is_foreign_key_violation, is_unique_violation};
use kernel::id::{AttorneyId, CaseId, ClientId, DocumentId};
use kernel::page::Page;
use sqlx::SqlitePool;

use crate::domain::entity::{Case, CaseFields, Document, Metadata, NewDocument};
use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::domain::value_object::{CaseNumber, ContentType};
use crate::error::{CaseError, CaseResult};

const CASE_COLUMNS: &str = "id, case_number, title, case_type, status, court, jurisdiction, \
     filing_date, description, practice_area, statute_of_limitations, opposing_counsel, judge, \
     assigned_attorney_id, client_id, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, case_id, filename, file_path, file_type, file_size, \
     upload_date, description, document_metadata, deletion_pending";

/// SQLite-backed case and document store
#[derive(Clone)]
pub struct SqliteCaseRepository {
    pool: SqlitePool,
}

impl SqliteCaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_case_write_error(err: sqlx::Error) -> CaseError {
    if is_unique_violation(&err) && err.to_string().contains("cases.case_number") {
        return CaseError::CaseNumberTaken;
    }
    if is_foreign_key_violation(&err) {
        return CaseError::Validation("Assigned attorney or client does not exist".into());
    }
    CaseError::Database(err)
}

fn map_document_write_error(err: sqlx::Error) -> CaseError {
    if is_unique_violation(&err) && err.to_string().contains("documents.file_path") {
        return CaseError::PathTaken;
    }
    if is_foreign_key_violation(&err) {
        return CaseError::CaseNotFound;
    }
    CaseError::Database(err)
}

fn encode_metadata(metadata: Option<&Metadata>) -> CaseResult<Option<String>> {
    metadata
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| CaseError::Internal(format!("metadata serialization failed: {e}")))
}

// ============================================================================
// Case Repository Implementation
// ============================================================================

impl CaseRepository for SqliteCaseRepository {
    async fn create_case(&self, fields: &CaseFields, now: DateTime<Utc>) -> CaseResult<Case> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO cases (
                case_number,
                title,
                case_type,
                status,
                court,
                jurisdiction,
                filing_date,
                description,
                practice_area,
                statute_of_limitations,
                opposing_counsel,
                judge,
                assigned_attorney_id,
                client_id,
                created_at,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.case_number.as_str())
        .bind(&fields.title)
        .bind(&fields.case_type)
        .bind(&fields.status)
        .bind(&fields.court)
        .bind(&fields.jurisdiction)
        .bind(fields.filing_date)
        .bind(&fields.description)
        .bind(&fields.practice_area)
        .bind(fields.statute_of_limitations)
        .bind(&fields.opposing_counsel)
        .bind(&fields.judge)
        .bind(fields.assigned_attorney_id.map(i64::from))
        .bind(fields.client_id.map(i64::from))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_case_write_error)?;

        tx.commit().await?;

        Ok(Case {
            id: CaseId::from_i64(result.last_insert_rowid()),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_case(&self, id: CaseId) -> CaseResult<Option<Case>> {
        let row = sqlx::query_as::<_, CaseRow>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CaseRow::into_case))
    }

    async fn case_exists(&self, id: CaseId) -> CaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM cases WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn list_cases(&self, page: Page) -> CaseResult<Vec<Case>> {
        let rows = sqlx::query_as::<_, CaseRow>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CaseRow::into_case).collect())
    }

    async fn update_case(&self, case: &Case) -> CaseResult<()> {
        let fields = &case.fields;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE cases SET
                case_number = ?,
                title = ?,
                case_type = ?,
                status = ?,
                court = ?,
                jurisdiction = ?,
                filing_date = ?,
                description = ?,
                practice_area = ?,
                statute_of_limitations = ?,
                opposing_counsel = ?,
                judge = ?,
                assigned_attorney_id = ?,
                client_id = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.case_number.as_str())
        .bind(&fields.title)
        .bind(&fields.case_type)
        .bind(&fields.status)
        .bind(&fields.court)
        .bind(&fields.jurisdiction)
        .bind(fields.filing_date)
        .bind(&fields.description)
        .bind(&fields.practice_area)
        .bind(fields.statute_of_limitations)
        .bind(&fields.opposing_counsel)
        .bind(&fields.judge)
        .bind(fields.assigned_attorney_id.map(i64::from))
        .bind(fields.client_id.map(i64::from))
        .bind(case.updated_at)
        .bind(case.id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(map_case_write_error)?;

        if result.rows_affected() == 0 {
            return Err(CaseError::CaseNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_case(&self, id: CaseId) -> CaseResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cases WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Document Repository Implementation
// ============================================================================

impl DocumentRepository for SqliteCaseRepository {
    async fn insert_document(&self, doc: NewDocument) -> CaseResult<Document> {
        let metadata = encode_metadata(doc.metadata.as_ref())?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO documents (
                case_id,
                filename,
                file_path,
                file_type,
                file_size,
                upload_date,
                description,
                document_metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(doc.case_id.as_i64())
        .bind(&doc.filename)
        .bind(&doc.file_path)
        .bind(doc.file_type.mime())
        .bind(doc.file_size)
        .bind(doc.upload_date)
        .bind(&doc.description)
        .bind(metadata)
        .execute(&mut *tx)
        .await
        .map_err(map_document_write_error)?;

        tx.commit().await?;

        Ok(doc.into_document(DocumentId::from_i64(result.last_insert_rowid())))
    }

    async fn find_document(&self, id: DocumentId) -> CaseResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn list_documents(&self, case_id: CaseId, page: Page) -> CaseResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE case_id = ? AND deletion_pending = 0 \
             ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(case_id.as_i64())
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn update_document(
        &self,
        id: DocumentId,
        filename: &str,
        description: Option<&str>,
        metadata: Option<&Metadata>,
    ) -> CaseResult<()> {
        let metadata = encode_metadata(metadata)?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents SET
                filename = ?,
                description = ?,
                document_metadata = ?
            WHERE id = ? AND deletion_pending = 0
            "#,
        )
        .bind(filename)
        .bind(description)
        .bind(metadata)
        .bind(id.as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CaseError::DocumentNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_document(&self, id: DocumentId) -> CaseResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_deletion_pending(&self, id: DocumentId) -> CaseResult<()> {
        sqlx::query("UPDATE documents SET deletion_pending = 1 WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_deletion_pending(&self) -> CaseResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE deletion_pending = 1 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct CaseRow {
    id: i64,
    case_number: String,
    title: String,
    case_type: String,
    status: String,
    court: Option<String>,
    jurisdiction: Option<String>,
    filing_date: Option<DateTime<Utc>>,
    description: Option<String>,
    practice_area: Option<String>,
    statute_of_limitations: Option<DateTime<Utc>>,
    opposing_counsel: Option<String>,
    judge: Option<String>,
    assigned_attorney_id: Option<i64>,
    client_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaseRow {
    fn into_case(self) -> Case {
        Case {
            id: CaseId::from_i64(self.id),
            fields: CaseFields {
                case_number: CaseNumber::from_db(self.case_number),
                title: self.title,
                case_type: self.case_type,
                status: self.status,
                court: self.court,
                jurisdiction: self.jurisdiction,
                filing_date: self.filing_date,
                description: self.description,
                practice_area: self.practice_area,
                statute_of_limitations: self.statute_of_limitations,
                opposing_counsel: self.opposing_counsel,
                judge: self.judge,
                assigned_attorney_id: self.assigned_attorney_id.map(AttorneyId::from_i64),
                client_id: self.client_id.map(ClientId::from_i64),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    case_id: i64,
    filename: String,
    file_path: String,
    file_type: String,
    file_size: i64,
    upload_date: DateTime<Utc>,
    description: Option<String>,
    document_metadata: Option<String>,
    deletion_pending: bool,
}

impl DocumentRow {
    fn into_document(self) -> CaseResult<Document> {
        let file_type = ContentType::from_mime(&self.file_type).ok_or_else(|| {
            CaseError::Internal(format!("Invalid file type in database: {}", self.file_type))
        })?;

        let metadata = self
            .document_metadata
            .as_deref()
            .map(serde_json::from_str::<Metadata>)
            .transpose()
            .map_err(|e| {
                CaseError::Internal(format!("Invalid metadata in database for {}: {e}", self.id))
            })?;

        Ok(Document {
            id: DocumentId::from_i64(self.id),
            case_id: CaseId::from_i64(self.case_id),
            filename: self.filename,
            file_path: self.file_path,
            file_type,
            file_size: self.file_size,
            upload_date: self.upload_date,
            description: self.description,
            metadata,
            deletion_pending: self.deletion_pending,
        })
    }
}
