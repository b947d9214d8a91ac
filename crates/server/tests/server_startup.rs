use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::{sleep, timeout};

/// Environment variables that would override the config file.
const OVERRIDE_ENV: &[&str] = &[
    "PORT",
    "DO_SPACES_KEY",
    "DO_SPACES_SECRET",
    "DO_SPACES_BUCKET",
    "THETA_API_KEY",
    "THETA_API_SECRET",
];

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn minimal_config(port: u16, media_root: &Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[media]
public_dir = "{root}/public"
staging_dir = "{root}/tmp"

[storage]
endpoint = "http://127.0.0.1:9"
bucket = "startup-test"
access_key_id = "AKIDSTARTUP"
secret_access_key = "startup-secret"
force_path_style = true

[transcoder]
api_key = "srvacc_startup"
api_secret = "startup-theta-secret"

[janitor]
enabled = false
"#,
        port = port,
        root = media_root.display()
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn server_command(config_path: &Path) -> tokio::process::Command {
    let mut command = tokio::process::Command::new(env!("CARGO_BIN_EXE_zesha"));
    command
        .env("ZESHA_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true);
    for name in OVERRIDE_ENV {
        command.env_remove(name);
    }
    command
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/healthz", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let media = TempDir::new().unwrap();
    let config = write_config(&minimal_config(port, media.path()));

    let mut server = server_command(config.path())
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/healthz", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    // Media directories are created at startup.
    assert!(media.path().join("public").is_dir());
    assert!(media.path().join("tmp").is_dir());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let media = TempDir::new().unwrap();
    let config = write_config(&minimal_config(port, media.path()));

    let mut server = server_command(config.path())
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/config", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["storage"]["bucket"], "startup-test");
    assert_eq!(json["storage"]["credentials_configured"], true);
    assert!(!json.to_string().contains("startup-secret"));

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        server_command(Path::new("/nonexistent/config.toml")).output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_missing_credentials_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 8090

[storage]
bucket = "videos"
"#,
    );

    let result = timeout(Duration::from_secs(5), server_command(config.path()).output())
        .await
        .expect("Command timed out")
        .expect("Failed to execute command");

    assert!(!result.status.success());
}
