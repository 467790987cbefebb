mod common;

use common::{document_json, hx_redirect, TestApp, APPROVER, AUTHOR, WORKSPACE_ID};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn to_review_lists_only_documents_the_user_may_decide() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(APPROVER).await;
    app.mount_document_list(vec![
        document_json("doc-1", "Supplier contract", "pending_validation", AUTHOR),
        document_json("doc-2", "Own memo", "pending_validation", APPROVER),
        document_json("doc-3", "Draft policy", "draft", AUTHOR),
    ])
    .await;

    let response = app.get("/documents/to-review").await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Supplier contract"));
    assert!(!body.contains("Own memo"));
    assert!(!body.contains("Draft policy"));
}

#[tokio::test]
async fn document_list_applies_status_filter() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(APPROVER).await;
    app.mount_document_list(vec![
        document_json("doc-1", "Supplier contract", "approved", AUTHOR),
        document_json("doc-2", "Draft policy", "draft", AUTHOR),
    ])
    .await;

    let response = app.get("/documents?status=approved").await;

    let body = response.text().await.unwrap();
    assert!(body.contains("Supplier contract"));
    assert!(!body.contains("Draft policy"));
}

#[tokio::test]
async fn document_page_shows_only_permitted_actions() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(APPROVER).await;
    app.mount_document(document_json("doc-1", "Contract", "pending_validation", AUTHOR))
        .await;

    let response = app.get("/documents/doc-1").await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("/documents/doc-1/approve"));
    assert!(body.contains("/documents/doc-1/reject"));
    assert!(!body.contains("/documents/doc-1/submit"));
    assert!(!body.contains("/documents/doc-1/edit"));
}

#[tokio::test]
async fn author_sees_no_decision_on_own_pending_version() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(AUTHOR).await;
    app.mount_document(document_json("doc-1", "Contract", "pending_validation", AUTHOR))
        .await;

    let body = app.get("/documents/doc-1").await.text().await.unwrap();

    assert!(!body.contains("/documents/doc-1/approve"));
    assert!(!body.contains("/documents/doc-1/reject"));
    assert!(body.contains("/documents/doc-1/cancel"));
}

#[tokio::test]
async fn preview_streams_pdf_inline() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(APPROVER).await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/workspaces/{}/documents/doc-1/preview",
            WORKSPACE_ID
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 test".to_vec()),
        )
        .mount(&app.backend)
        .await;

    let response = app.get("/documents/doc-1/preview").await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert!(response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("inline"));
    assert!(response.bytes().await.unwrap().starts_with(b"%PDF-"));
}

#[tokio::test]
async fn non_pdf_upload_is_rejected_before_the_backend() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(AUTHOR).await;
    Mock::given(method("POST"))
        .and(path(format!("/workspaces/{}/documents", WORKSPACE_ID)))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Notes")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"plain text".to_vec()).file_name("notes.txt"),
        );
    let response = app
        .client
        .post(app.url("/documents"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn pdf_upload_creates_the_document() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(AUTHOR).await;
    Mock::given(method("POST"))
        .and(path(format!("/workspaces/{}/documents", WORKSPACE_ID)))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(document_json("doc-9", "Annual report", "draft", AUTHOR)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Annual report")
        .text("description", "FY2025")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"%PDF-1.7 body".to_vec()).file_name("report.pdf"),
        );
    let response = app
        .client
        .post(app.url("/documents"))
        .header("HX-Request", "true")
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(hx_redirect(&response), Some("/documents/doc-9".to_string()));
}

fn document_path(document_id: &str) -> String {
    format!("/workspaces/{}/documents/{}", WORKSPACE_ID, document_id)
}

#[tokio::test]
async fn creator_metadata_update_is_forwarded_trimmed() {
    for status in ["draft", "pending_validation"] {
        let app = TestApp::spawn().await;
        app.login_into_workspace(AUTHOR).await;
        app.mount_document(document_json("doc-1", "Contract", status, AUTHOR))
            .await;
        Mock::given(method("PATCH"))
            .and(path(document_path("doc-1")))
            .and(body_partial_json(json!({
                "title": "Supplier contract",
                "description": "Signed copy",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(document_json("doc-1", "Supplier contract", status, AUTHOR)),
            )
            .expect(1)
            .mount(&app.backend)
            .await;

        let response = app
            .post_form(
                "/documents/doc-1/metadata",
                &[("title", "  Supplier contract "), ("description", " Signed copy  ")],
            )
            .await;

        assert_eq!(response.status(), 200, "status {}", status);
        assert_eq!(hx_redirect(&response), Some("/documents/doc-1".to_string()));
    }
}

#[tokio::test]
async fn creator_content_update_is_forwarded() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(AUTHOR).await;
    app.mount_document(document_json("doc-1", "Contract", "draft", AUTHOR))
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/content", document_path("doc-1"))))
        .and(body_partial_json(json!({ "content": "Clause 1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(document_json("doc-1", "Contract", "draft", AUTHOR)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/documents/doc-1/content", &[("content", "Clause 1")])
        .await;

    assert_eq!(hx_redirect(&response), Some("/documents/doc-1".to_string()));
}

#[tokio::test]
async fn creator_can_open_the_edit_page_of_a_draft() {
    let app = TestApp::spawn().await;
    app.login_into_workspace(AUTHOR).await;
    app.mount_document(document_json("doc-1", "Contract", "draft", AUTHOR))
        .await;

    let response = app.get("/documents/doc-1/edit").await;

    assert_eq!(response.status(), 200);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("/documents/doc-1/metadata"));
}

/// Metadata, content and the edit page are all refused without reaching the backend.
async fn assert_editing_refused(app: &TestApp) {
    Mock::given(method("PATCH"))
        .and(path(document_path("doc-1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/content", document_path("doc-1"))))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/documents/doc-1/metadata", &[("title", "Changed")])
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .post_form("/documents/doc-1/content", &[("content", "Changed")])
        .await;
    assert_eq!(response.status(), 403);

    let response = app.get("/documents/doc-1/edit").await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn approver_cannot_edit_someone_elses_document() {
    for status in ["draft", "pending_validation"] {
        let app = TestApp::spawn().await;
        app.login_into_workspace(APPROVER).await;
        app.mount_document(document_json("doc-1", "Contract", status, AUTHOR))
            .await;

        assert_editing_refused(&app).await;
    }
}

#[tokio::test]
async fn decided_documents_cannot_be_edited() {
    for status in ["approved", "rejected"] {
        let app = TestApp::spawn().await;
        app.login_into_workspace(AUTHOR).await;
        app.mount_document(document_json("doc-1", "Contract", status, AUTHOR))
            .await;

        assert_editing_refused(&app).await;
    }
}
