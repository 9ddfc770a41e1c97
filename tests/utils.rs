#![allow(dead_code)]

use std::fs;
use std::net::TcpListener;
use synomagnet::client::{AUTH_API, TASK_API};
use synomagnet::config::Config;
use synomagnet::store::Store;
use tempfile::TempDir;
use wiremock::ResponseTemplate;

/// # Panics
///
/// Will panic if a file can't be read or missing
#[must_use = "This function returns the body of the file as a string"]
pub fn body_from_file(path: &str) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

/// JSON reply with the body of a file under `test-files/`
pub fn json_response(file: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("content-type", "application/json")
        .set_body_string(body_from_file(&format!("test-files/{file}")))
}

/// JSON reply of a failed call with the given error code
pub fn error_response(code: i32) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("content-type", "application/json")
        .set_body_string(format!(r#"{{"error":{{"code":{code}}},"success":false}}"#))
}

/// Configuration for `alice` on `server` with discovered API paths
pub fn test_config(server: &str) -> Config {
    Config {
        server: server.to_string(),
        user: String::from("alice"),
        download_dir: String::from("downloads"),
        conversion_dir: String::from("convert"),
        api_paths: Some(
            [(AUTH_API, "auth.cgi"), (TASK_API, "task.cgi")]
                .into_iter()
                .collect(),
        ),
        verify_certificates: false,
    }
}

/// Store rooted in a fresh temporary directory
///
/// # Panics
///
/// Will panic if the directory can't be created
pub fn temp_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store = Store::in_dir(dir.path());
    (dir, store)
}

/// Base URL of a local port nothing listens on
///
/// # Panics
///
/// Will panic if no local port can be bound
pub fn closed_port_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind a local port");
    let port = listener.local_addr().expect("Failed to read local address").port();
    format!("http://127.0.0.1:{port}")
}
