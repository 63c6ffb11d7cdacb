//! Test helpers for Web API tests.
//!
//! Each test gets its own temporary store directory.

#![allow(dead_code)]

use std::io::{Cursor, Read};
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use filedrop::config::WebConfig;
use filedrop::web::create_router;
use filedrop::{AppState, FileStore, UploadPolicy};

/// A running test server and the store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: FileStore,
    _temp_dir: TempDir,
}

/// Create a test server with the default upload policy.
pub fn create_test_app() -> TestApp {
    create_test_app_with_policy(UploadPolicy::default())
}

/// Create a test server with a custom upload policy.
pub fn create_test_app_with_policy(policy: UploadPolicy) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(temp_dir.path().join("uploads"));

    let app_state = Arc::new(AppState::new(store.clone(), policy));
    let router = create_router(app_state, &WebConfig::default());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        _temp_dir: temp_dir,
    }
}

/// Build a multipart form with a single "file" part.
pub fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}

/// Upload a file and return its stored name.
pub async fn upload(app: &TestApp, filename: &str, content: &[u8]) -> String {
    let response = app
        .server
        .post("/api/upload")
        .multipart(file_form(filename, content))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["data"]["stored_name"]
        .as_str()
        .expect("stored_name missing")
        .to_string()
}

/// Read every entry of a ZIP archive as (name, content), in archive order.
pub fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Invalid ZIP archive");
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }

    entries
}
