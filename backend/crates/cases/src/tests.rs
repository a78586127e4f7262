//! HTTP-level tests for cases and documents behind the auth middleware

use std::path::Path;

use auth::domain::repository::UserRepository;
use auth::models::{Email, NewUser, UserName, UserRole};
use auth::{
    AccessPolicy, AuthAppState, AuthConfig, DocumentAccess, SqliteUserRepository,
    resolve_request_context,
};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use kernel::id::{CaseId, DocumentId};
use platform::password::ClearTextPassword;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::application::ReconcileStorageUseCase;
use crate::domain::repository::DocumentRepository;
use crate::presentation::router::cases_router;
use crate::test_support::memory_pool;
use crate::{CasesAppState, CasesConfig, DocumentStore, SqliteCaseRepository};

const BOUNDARY: &str = "legal-test-boundary";

struct TestApp {
    router: Router,
    auth: AuthAppState<SqliteUserRepository>,
    cases: CasesAppState<SqliteCaseRepository>,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(AccessPolicy::default(), 1024 * 1024).await
    }

    async fn with(policy: AccessPolicy, max_upload_bytes: u64) -> Self {
        let pool = memory_pool().await;
        let dir = TempDir::new().unwrap();
        let upload_dir = dir.path().join("uploads");

        let auth = AuthAppState::new(
            SqliteUserRepository::new(pool.clone()),
            AuthConfig {
                policy,
                ..AuthConfig::with_random_secret()
            },
        );

        let store = DocumentStore::new(upload_dir.clone()).await.unwrap();
        let cases = CasesAppState::new(
            SqliteCaseRepository::new(pool),
            store,
            CasesConfig {
                policy,
                upload_dir,
                max_upload_bytes,
            },
        );

        let router = cases_router(cases.clone()).layer(
            axum::middleware::from_fn_with_state(
                auth.clone(),
                resolve_request_context::<SqliteUserRepository>,
            ),
        );

        Self {
            router,
            auth,
            cases,
            _dir: dir,
        }
    }

    /// Create a user and return a bearer token for it
    async fn token(&self, name: &str, role: UserRole) -> String {
        let hash = ClearTextPassword::new("pw123".into())
            .unwrap()
            .hash(None)
            .unwrap();
        let user = self
            .auth
            .repo
            .create(&NewUser::new(
                UserName::new(name).unwrap(),
                Email::new(format!("{name}@example.com")).unwrap(),
                hash,
                role,
            ))
            .await
            .unwrap();

        self.auth.config.token_service().issue(user.id)
    }

    fn root(&self) -> &Path {
        self.cases.store.root()
    }

    async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(req.body(body).unwrap()).await
    }

    async fn create_case(&self, token: &str, number: &str) -> CaseId {
        let response = self
            .request(
                "POST",
                "/cases",
                Some(token),
                Some(json!({
                    "case_number": number,
                    "title": "Smith v. Jones",
                    "case_type": "civil",
                    "status": "open",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        CaseId::from_i64(json_body(response).await["id"].as_i64().unwrap())
    }

    async fn upload(&self, token: Option<&str>, case_id: CaseId, form: Multipart) -> Response {
        let mut req = Request::post(format!("/cases/{case_id}/documents")).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::from(form.finish())).unwrap()).await
    }
}

/// Hand-built multipart/form-data body
#[derive(Default)]
struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    fn file(mut self, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

fn pdf(data: &[u8]) -> Multipart {
    Multipart::default().file("brief.pdf", "application/pdf", data)
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Regular files anywhere under `dir`
fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .map(|e| e.unwrap().path())
        .map(|p| if p.is_dir() { count_files(&p) } else { 1 })
        .sum()
}

// ============================================================================
// Cases
// ============================================================================

#[tokio::test]
async fn test_case_crud_for_attorney() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-2025-001").await;

    let response = app
        .request("GET", &format!("/cases/{case_id}"), Some(&attorney), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["case_number"], "CV-2025-001");

    let response = app
        .request(
            "PUT",
            &format!("/cases/{case_id}"),
            Some(&attorney),
            Some(json!({ "status": "closed", "judge": "Hon. Lee" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["status"], "closed");
    assert_eq!(updated["judge"], "Hon. Lee");
    assert_eq!(updated["title"], "Smith v. Jones");

    app.create_case(&attorney, "CV-2025-002").await;
    let response = app
        .request("GET", "/cases?skip=1&limit=10", Some(&attorney), None)
        .await;
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["case_number"], "CV-2025-002");
}

#[tokio::test]
async fn test_case_roles() {
    let app = TestApp::new().await;
    let admin = app.token("admin", UserRole::Admin).await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let staff = app.token("sam", UserRole::Staff).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let response = app.request("GET", "/cases", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/cases", Some(&staff), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // role before existence
    let response = app.request("GET", "/cases/9999", Some(&staff), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uri = format!("/cases/{case_id}");
    let response = app.request("DELETE", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.request("DELETE", "/cases/9999", Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_case_number_is_400() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    app.create_case(&attorney, "CV-1").await;

    let response = app
        .request(
            "POST",
            "/cases",
            Some(&attorney),
            Some(json!({
                "case_number": "CV-1",
                "title": "Other",
                "case_type": "civil",
                "status": "open",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["detail"], "Case number already registered");
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_download_and_metadata_round_trip() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let form = pdf(b"%PDF-1.7 test")
        .text("description", "Opening brief")
        .text("metadata", r#"{"tag":"x"}"#);
    let response = app.upload(Some(&attorney), case_id, form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = json_body(response).await;
    assert_eq!(created["case_id"], case_id.as_i64());
    assert_eq!(created["filename"], "brief.pdf");
    assert_eq!(created["file_type"], "application/pdf");
    assert_eq!(created["file_size"], 13);
    assert_eq!(created["description"], "Opening brief");
    assert_eq!(created["document_metadata"], json!({ "tag": "x" }));

    let key = created["file_path"].as_str().unwrap();
    assert!(key.starts_with(&format!("{case_id}/")));
    assert!(key.ends_with(&format!("_{case_id}_brief.pdf")));
    assert_eq!(std::fs::read(app.root().join(key)).unwrap(), b"%PDF-1.7 test");
    assert_eq!(count_files(app.root()), 1);

    let id = created["id"].as_i64().unwrap();
    let response = app
        .request("GET", &format!("/documents/{id}"), Some(&attorney), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["document_metadata"].to_string(),
        r#"{"tag":"x"}"#
    );

    let response = app
        .request("GET", &format!("/documents/{id}/download"), Some(&attorney), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"brief.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7 test");

    let response = app
        .request("GET", &format!("/cases/{case_id}/documents"), Some(&attorney), None)
        .await;
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_zip_upload_is_rejected_before_any_write() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let form = Multipart::default().file("archive.zip", "application/zip", b"PK\x03\x04");
    let response = app.upload(Some(&attorney), case_id, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        json_body(response).await["detail"]
            .as_str()
            .unwrap()
            .starts_with("File type not allowed")
    );
    assert_eq!(count_files(app.root()), 0);
}

#[tokio::test]
async fn test_oversized_upload_leaves_no_file() {
    let app = TestApp::with(AccessPolicy::default(), 1024).await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let response = app.upload(Some(&attorney), case_id, pdf(&[b'a'; 4096])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count_files(app.root()), 0);

    // exactly at the limit is fine
    let response = app.upload(Some(&attorney), case_id, pdf(&[b'a'; 1024])).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_to_missing_case_is_404_without_side_effects() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;

    let response = app
        .upload(Some(&attorney), CaseId::from_i64(4242), pdf(b"data"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "Case not found");
    assert!(!app.root().join("4242").exists());
}

#[tokio::test]
async fn test_malformed_metadata_is_400() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    for metadata in ["{not json", "[1,2]"] {
        let form = pdf(b"data").text("metadata", metadata);
        let response = app.upload(Some(&attorney), case_id, form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{metadata}");
    }
    assert_eq!(count_files(app.root()), 0);
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let form = Multipart::default().text("description", "no file");
    let response = app.upload(Some(&attorney), case_id, form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_filename_cannot_escape_case_directory() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let form = Multipart::default().file("../../escape.txt", "text/plain", b"hi");
    let response = app.upload(Some(&attorney), case_id, form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = json_body(response).await;
    assert_eq!(created["filename"], "escape.txt");
    assert!(
        created["file_path"]
            .as_str()
            .unwrap()
            .starts_with(&format!("{case_id}/"))
    );
    assert_eq!(count_files(&app.root().join(case_id.to_string())), 1);
}

// ============================================================================
// Document access
// ============================================================================

#[tokio::test]
async fn test_document_access_checks_existence_before_role() {
    let policy = AccessPolicy {
        document_access: DocumentAccess::CaseRoles,
        ..Default::default()
    };
    let app = TestApp::with(policy, 1024 * 1024).await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let staff = app.token("sam", UserRole::Staff).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let response = app.upload(None, case_id, pdf(b"data")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .upload(Some(&staff), CaseId::from_i64(4242), pdf(b"data"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.upload(Some(&staff), case_id, pdf(b"data")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(count_files(app.root()), 0);
}

#[tokio::test]
async fn test_open_document_access_needs_no_token() {
    let policy = AccessPolicy {
        document_access: DocumentAccess::Open,
        ..Default::default()
    };
    let app = TestApp::with(policy, 1024 * 1024).await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let response = app.upload(None, case_id, pdf(b"data")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // case endpoints still need a principal
    let response = app.request("GET", "/cases", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Update and delete
// ============================================================================

#[tokio::test]
async fn test_update_document_changes_display_fields_only() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;
    let created = json_body(app.upload(Some(&attorney), case_id, pdf(b"data")).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/documents/{id}"),
            Some(&attorney),
            Some(json!({
                "filename": "../final brief.pdf",
                "description": "Final",
                "document_metadata": { "stage": "final" },
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["filename"], "final_brief.pdf");
    assert_eq!(updated["description"], "Final");
    assert_eq!(updated["document_metadata"], json!({ "stage": "final" }));
    assert_eq!(updated["file_path"], created["file_path"]);
}

#[tokio::test]
async fn test_delete_document_removes_file_and_record() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;
    let created = json_body(app.upload(Some(&attorney), case_id, pdf(b"data")).await).await;
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/documents/{id}");
    let response = app.request("DELETE", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(count_files(app.root()), 0);

    let response = app.request("GET", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.request("DELETE", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_of_missing_file_is_not_found() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;
    let created = json_body(app.upload(Some(&attorney), case_id, pdf(b"data")).await).await;
    let id = created["id"].as_i64().unwrap();
    std::fs::remove_file(app.root().join(created["file_path"].as_str().unwrap())).unwrap();

    let response = app
        .request("GET", &format!("/documents/{id}/download"), Some(&attorney), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], "Document not found");

    // the record itself is untouched
    let response = app
        .request("GET", &format!("/documents/{id}"), Some(&attorney), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_file_delete_is_surfaced_and_retried() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;
    let created = json_body(app.upload(Some(&attorney), case_id, pdf(b"data")).await).await;
    let id = created["id"].as_i64().unwrap();
    let stored = app.root().join(created["file_path"].as_str().unwrap());

    // a non-empty directory where the file was cannot be unlinked
    std::fs::remove_file(&stored).unwrap();
    std::fs::create_dir(&stored).unwrap();
    std::fs::write(stored.join("blocker"), b"x").unwrap();

    let uri = format!("/documents/{id}");
    let response = app.request("DELETE", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["detail"], "Internal server error");

    let pending = app
        .cases
        .repo
        .find_document(DocumentId::from_i64(id))
        .await
        .unwrap()
        .unwrap();
    assert!(pending.deletion_pending);

    let response = app.request("GET", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .request("GET", &format!("/cases/{case_id}/documents"), Some(&attorney), None)
        .await;
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);

    std::fs::remove_dir_all(&stored).unwrap();
    let response = app.request("DELETE", &uri, Some(&attorney), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        app.cases
            .repo
            .find_document(DocumentId::from_i64(id))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_deleting_case_removes_documents_and_files() {
    let app = TestApp::new().await;
    let admin = app.token("admin", UserRole::Admin).await;
    let case_id = app.create_case(&admin, "CV-1").await;
    let created = json_body(app.upload(Some(&admin), case_id, pdf(b"data")).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request("DELETE", &format!("/cases/{case_id}"), Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request("GET", &format!("/documents/{id}"), Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!app.root().join(case_id.to_string()).exists());
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_reconcile_cleans_up_leftovers() {
    let app = TestApp::new().await;
    let attorney = app.token("alice", UserRole::Attorney).await;
    let case_id = app.create_case(&attorney, "CV-1").await;

    let kept = json_body(app.upload(Some(&attorney), case_id, pdf(b"keep")).await).await;
    let doomed = json_body(app.upload(Some(&attorney), case_id, pdf(b"drop")).await).await;
    let doomed_id = DocumentId::from_i64(doomed["id"].as_i64().unwrap());
    app.cases.repo.mark_deletion_pending(doomed_id).await.unwrap();

    app.cases.store.write_temp(case_id, b"partial").await.unwrap();
    std::fs::create_dir_all(app.root().join("4242")).unwrap();
    std::fs::write(app.root().join("4242").join("orphan.pdf"), b"x").unwrap();

    let report = ReconcileStorageUseCase::new(app.cases.repo.clone(), app.cases.store.clone())
        .execute()
        .await
        .unwrap();

    assert_eq!(report.documents_removed, 1);
    assert_eq!(report.documents_failed, 0);
    assert_eq!(report.temp_files_removed, 1);
    assert_eq!(report.case_dirs_removed, 1);

    assert!(
        app.cases
            .repo
            .find_document(doomed_id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(count_files(app.root()), 1);
    assert!(
        app.root()
            .join(kept["file_path"].as_str().unwrap())
            .exists()
    );
}
