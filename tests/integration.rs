use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn heline_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("heline");
    path
}

fn setup_test_env(engine_url: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[server]
bind = "127.0.0.1:0"

[engine]
base_url = "{}"
code_core = "heline"
docset_core = "docset"
timeout_secs = 2

[indexer]
base_url = "http://127.0.0.1:9"
"#,
        engine_url
    );

    let config_path = config_dir.join("heline.toml");
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn run_heline(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = heline_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("SOLR_BASE_URL")
        .env_remove("INDEXER_URL")
        .env_remove("HELINE_BIND")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run heline binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_help_lists_commands() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    let (stdout, _, success) = run_heline(&config_path, &["--help"]);
    assert!(success);
    for command in ["serve", "scrape", "setup", "reset", "search"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("heline.toml");
    fs::write(&config_path, "[engine]\ntimeout_secs = 0\n").unwrap();

    let (_, stderr, success) = run_heline(&config_path, &["search", "x"]);
    assert!(!success);
    assert!(stderr.contains("timeout_secs"), "stderr: {}", stderr);
}

#[test]
fn test_scrape_rejects_bad_repo() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    let (_, stderr, success) = run_heline(&config_path, &["scrape", "github", "widget"]);
    assert!(!success);
    assert!(stderr.contains("owner/name"), "stderr: {}", stderr);
}

#[test]
fn test_search_empty_query() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    let (stdout, _, success) = run_heline(&config_path, &["search", "  "]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_unreachable_engine_fails() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    let (_, stderr, success) = run_heline(&config_path, &["search", "fn main"]);
    assert!(!success);
    assert!(stderr.contains("engine request failed"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_search_prints_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/heline/select"))
        .and(query_param("hl", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"numFound": 1, "docs": [{"id": "/acme/widget/blob/main/a.rs", "repo": "acme/widget"}]},
            "highlighting": {"/acme/widget/blob/main/a.rs": {"content": ["<mark>fn</mark> main"]}}
        })))
        .mount(&server)
        .await;

    let (_tmp, config_path) = setup_test_env(&server.uri());
    let (stdout, stderr, success) = tokio::task::spawn_blocking(move || {
        run_heline(&config_path, &["search", "fn main", "--lang", "Rust"])
    })
    .await
    .unwrap();

    assert!(success, "stderr: {}", stderr);
    let printed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(printed["total"], 1);
    assert_eq!(printed["hits"][0]["repo"]["raw"], "acme/widget");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["filter"], json!(["lang:(Rust)"]));
}

#[tokio::test]
async fn test_reset_command() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/admin/cores"))
        .and(query_param("action", "STATUS"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": {"heline": {"name": "heline"}}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/solr/heline/update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"responseHeader": {"status": 0}})))
        .expect(1)
        .mount(&server)
        .await;

    let (_tmp, config_path) = setup_test_env(&server.uri());
    let (stdout, stderr, success) =
        tokio::task::spawn_blocking(move || run_heline(&config_path, &["reset"]))
            .await
            .unwrap();
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Index reset successful."));
}
