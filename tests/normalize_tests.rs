use pocketboss::backend::models::{DocumentStatus, ProcessingStatus};
use pocketboss::backend::{normalize, BackendError};

#[test]
fn test_projects_bare_and_wrapped() {
    let bare = normalize::projects(r#"[{"id": 4, "name": "Harbor Tower"}]"#).unwrap();
    assert_eq!(bare[0].id, "4");
    assert_eq!(bare[0].name, "Harbor Tower");

    let items = normalize::projects(r#"{"items": [{"id": "a", "name": "A"}]}"#).unwrap();
    assert_eq!(items.len(), 1);

    let projects =
        normalize::projects(r#"{"projects": [{"id": 1, "project_name": "Clinic"}]}"#).unwrap();
    assert_eq!(projects[0].name, "Clinic");
}

#[test]
fn test_projects_unknown_shape_fails_loudly() {
    let err = normalize::projects(r#"{"results": []}"#).unwrap_err();
    assert!(matches!(err, BackendError::UnexpectedShape { what: "project list", .. }));
}

#[test]
fn test_documents_normalize_fields() {
    let body = r#"{"documents": [
        {"id": 9, "file_name": "plan.pdf", "file_type": "pdf", "file_size": 2048,
         "created_at": 1700000000000, "processing_status": "PROCESSING", "projects_id": 4},
        {"id": "d2", "name": "legacy.doc"}
    ]}"#;

    let docs = normalize::documents(body).unwrap();
    assert_eq!(docs[0].id, "9");
    assert_eq!(docs[0].name, "plan.pdf");
    assert_eq!(docs[0].doc_type.as_deref(), Some("pdf"));
    assert_eq!(docs[0].size, Some(2048));
    assert_eq!(docs[0].status, DocumentStatus::Processing);
    assert_eq!(docs[0].project_id.as_deref(), Some("4"));
    assert_eq!(docs[0].uploaded_at.unwrap().timestamp(), 1_700_000_000);

    assert_eq!(docs[1].status, DocumentStatus::Pending);
}

#[test]
fn test_documents_unknown_status_word_fails() {
    let err = normalize::documents(r#"[{"id": 1, "name": "x", "status": "exploded"}]"#)
        .unwrap_err();
    assert!(matches!(err, BackendError::UnexpectedShape { .. }));
}

#[test]
fn test_upload_signature_shapes() {
    let flat = normalize::upload_signature(
        r#"{"upload_url": "https://s3.test/put?sig=1", "file_id": 77}"#,
    )
    .unwrap();
    assert_eq!(flat.upload_url, "https://s3.test/put?sig=1");
    assert_eq!(flat.upload_id, "77");
    assert!(flat.headers.is_empty());

    let wrapped = normalize::upload_signature(
        r#"{"data": {"signed_url": "https://s3.test/x", "id": "u1", "headers": {"x-amz-acl": "private"}}}"#,
    )
    .unwrap();
    assert_eq!(wrapped.upload_id, "u1");
    assert_eq!(wrapped.headers["x-amz-acl"], "private");
}

#[test]
fn test_upload_signature_without_url_fails() {
    assert!(normalize::upload_signature(r#"{"file_id": 1}"#).is_err());
    assert!(normalize::upload_signature(r#"{"url": "", "id": 1}"#).is_err());
}

#[test]
fn test_confirm_shapes() {
    for body in [
        r#"{"id": 5, "name": "a.pdf"}"#,
        r#"{"file": {"file_id": 5, "file_name": "a.pdf"}}"#,
        r#"{"data": {"id": "5", "name": "a.pdf"}}"#,
    ] {
        let confirmed = normalize::confirmed_upload(body).unwrap();
        assert_eq!(confirmed.file_id, "5");
        assert_eq!(confirmed.name, "a.pdf");
    }

    assert!(normalize::confirmed_upload(r#"{"ok": true}"#).is_err());
}

#[test]
fn test_file_status_shapes_and_words() {
    assert_eq!(
        normalize::file_status(r#"{"status": "completed"}"#).unwrap(),
        ProcessingStatus::Completed
    );
    assert_eq!(
        normalize::file_status(r#"{"processing_status": "FAILED"}"#).unwrap(),
        ProcessingStatus::Failed
    );
    assert_eq!(
        normalize::file_status(r#"{"file": {"status": "queued"}}"#).unwrap(),
        ProcessingStatus::Pending
    );
    assert_eq!(
        normalize::file_status(r#"{"data": {"status": "in_progress"}}"#).unwrap(),
        ProcessingStatus::Processing
    );

    assert!(normalize::file_status(r#"{"status": "weird"}"#).is_err());
    assert!(normalize::file_status("not json").is_err());
}

#[test]
fn test_user_and_login() {
    let wrapped = normalize::user(r#"{"user": {"id": 1, "email": "a@b.c"}}"#).unwrap();
    assert_eq!(wrapped.id, "1");
    assert_eq!(wrapped.email.as_deref(), Some("a@b.c"));

    let flat = normalize::user(r#"{"id": "u9", "name": "Sam"}"#).unwrap();
    assert_eq!(flat.name.as_deref(), Some("Sam"));

    assert_eq!(
        normalize::auth_token(r#"{"authToken": "eyJ.x"}"#).unwrap().as_str(),
        "eyJ.x"
    );
    assert!(normalize::auth_token(r#"{"jwt": "x"}"#).is_err());
}

#[test]
fn test_shape_error_truncates_body() {
    let long = format!(r#"{{"junk": "{}"}}"#, "x".repeat(1000));
    let BackendError::UnexpectedShape { body, .. } = normalize::user(&long).unwrap_err() else {
        panic!("expected shape error");
    };
    assert_eq!(body.chars().count(), 200);
}
