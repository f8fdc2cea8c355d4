//! End-to-end runs of the `corpsite` binary against the mock backend

use corpsite_core::entities::EntityKind;
use corpsite_core::session::AdminRole;
use corpsite_core::test_harness::{spawn, MockState, RunningServer};
use corpsite_core::test_utils::{project_json, SUPER_ADMIN_EMAIL, TEST_PASSWORD};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;

async fn backend() -> RunningServer {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    state.seed(
        EntityKind::Projects,
        (1..=7).map(|n| project_json(&format!("Tower {n}"), n != 7)),
    );
    spawn(Arc::new(state)).await.unwrap()
}

/// Run the binary off the async runtime so the backend keeps serving
async fn corpsite(base_url: &str, data_dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_corpsite"));
    command
        .arg("--api-url")
        .arg(base_url)
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env("CORPSITE_DATA_DIR", data_dir)
        .env_remove("CORPSITE_STORAGE_EPHEMERAL")
        .env_remove("RUST_LOG");
    tokio::task::spawn_blocking(move || command.output().unwrap())
        .await
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_persists_between_invocations() {
    let server = backend().await;
    let data_dir = TempDir::new().unwrap();
    let base = server.base_url();

    let out = corpsite(&base, data_dir.path(), &["whoami"]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("Not logged in"));

    let out = corpsite(
        &base,
        data_dir.path(),
        &["login", "--email", SUPER_ADMIN_EMAIL, "--password", TEST_PASSWORD],
    )
    .await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = corpsite(&base, data_dir.path(), &["whoami"]).await;
    assert!(stdout(&out).contains("super_admin"));

    let out = corpsite(&base, data_dir.path(), &["list", "projects", "--search", "tower 3"]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("Tower 3"));
    assert!(!stdout(&out).contains("Tower 4"));

    let out = corpsite(&base, data_dir.path(), &["logout"]).await;
    assert!(out.status.success());
    let out = corpsite(&base, data_dir.path(), &["list", "projects"]).await;
    assert!(!out.status.success());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_public_list_and_carousel_without_login() {
    let server = backend().await;
    let data_dir = TempDir::new().unwrap();
    let base = server.base_url();

    let out = corpsite(&base, data_dir.path(), &["list", "projects", "--public"]).await;
    assert!(out.status.success());
    assert!(!stdout(&out).contains("Tower 7"));

    let out = corpsite(&base, data_dir.path(), &["carousel", "projects", "--width", "1000", "--steps", "rr"]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("offset -648px"));

    let out = corpsite(&base, data_dir.path(), &["lang", "ar"]).await;
    assert!(stdout(&out).contains("ar (rtl)"));
    let out = corpsite(&base, data_dir.path(), &["carousel", "projects", "--width", "1000", "--steps", "ll"]).await;
    assert!(stdout(&out).contains("offset 648px"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_filter_is_rejected() {
    let server = backend().await;
    let data_dir = TempDir::new().unwrap();
    let out = corpsite(
        &server.base_url(),
        data_dir.path(),
        &["list", "projects", "--public", "--filter", "color=red"],
    )
    .await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown filter"));
}
