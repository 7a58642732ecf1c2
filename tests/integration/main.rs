//! Integration tests for Zani

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config, state dir and API key
    fn zani(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("zani");
        cmd.arg("--no-local")
            .arg("--config")
            .arg(home.path().join("config.toml"))
            .env("XDG_STATE_HOME", home.path().join("state"))
            .env_remove("GOOGLE_API_KEY")
            .env_remove("ZANI_CONFIG");
        cmd
    }

    fn write_registry(workspace: &Path, body: &str) {
        fs::create_dir_all(workspace.join(".zani")).unwrap();
        fs::write(workspace.join(".zani/registry.json"), body).unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("zani")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("context cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("zani")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("zani"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        zani(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        zani(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[explicit_cache]"))
            .stdout(predicate::str::contains("min_tokens = 4096"));
    }

    #[test]
    fn config_set_rejects_unknown_key() {
        let home = TempDir::new().unwrap();
        zani(&home)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_set_local_writes_project_file() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();

        zani(&home)
            .current_dir(ws.path())
            .args(["config", "set", "explicit_cache.ttl_hours", "6", "--local"])
            .assert()
            .success();

        let content = fs::read_to_string(ws.path().join(".zani.toml")).unwrap();
        assert!(content.contains("[explicit_cache]"));
        assert!(content.contains("ttl_hours = 6"));
    }

    #[test]
    fn status_without_cache_json() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("main.py"), "print('hello')\n").unwrap();

        zani(&home)
            .args(["status", "--format", "json", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"active\": false"))
            .stdout(predicate::str::contains("\"should_offer_creation\": false"));
    }

    #[test]
    fn status_reports_forced_rebuild() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("a.txt"), "hello").unwrap();
        write_registry(
            ws.path(),
            r#"{
                "cache_id": "cachedContents/it",
                "file_hashes": { "a.txt": "00" },
                "file_sizes": { "a.txt": 5 },
                "total_project_bytes": 5,
                "ttl_expiry": "2999-01-01T00:00:00+00:00"
            }"#,
        );

        zani(&home)
            .args(["status", "--format", "json", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"cache_id\": \"cachedContents/it\""))
            .stdout(predicate::str::contains("\"verdict\": \"force\""))
            .stdout(predicate::str::contains("project changed 100.00%"));
    }

    #[test]
    fn status_treats_corrupt_registry_as_absent() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("a.txt"), "hello").unwrap();
        write_registry(ws.path(), "{ truncated");

        zani(&home)
            .args(["status", "--format", "json", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"active\": false"));
    }

    #[test]
    fn check_small_project_needs_no_cache() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("lib.rs"), "pub fn one() -> u8 { 1 }\n").unwrap();

        zani(&home)
            .args(["check", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache needed"));
    }

    #[test]
    fn check_declines_creation_without_yes() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("big.txt"), "x".repeat(20_000)).unwrap();

        zani(&home)
            .args(["check", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Continuing without a cache"));

        assert!(!ws.path().join(".zani/registry.json").exists());
    }

    #[test]
    fn init_requires_api_key() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        fs::write(ws.path().join("big.txt"), "x".repeat(20_000)).unwrap();

        zani(&home)
            .args(["init", "--yes", "--path"])
            .arg(ws.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("GOOGLE_API_KEY"));

        assert!(!ws.path().join(".zani/registry.json").exists());
    }

    #[test]
    fn stop_without_cache() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();

        zani(&home)
            .args(["stop", "--path"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No active cache"));
    }

    #[test]
    fn stop_clears_corrupt_registry() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();
        write_registry(ws.path(), "[]");

        zani(&home)
            .args(["stop", "--path"])
            .arg(ws.path())
            .assert()
            .success();

        assert!(!ws.path().join(".zani/registry.json").exists());
    }
}
