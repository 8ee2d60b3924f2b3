//! Integration tests for swcache
//!
//! The app origin points at a closed local port, so every network fetch
//! fails and the binary runs fully offline.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const UNREACHABLE_ORIGIN: &str = "http://127.0.0.1:9";

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new(version: &str) -> Self {
            let sandbox = Self {
                dir: TempDir::new().unwrap(),
            };
            sandbox.write_config(version);
            sandbox
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn storage_path(&self) -> PathBuf {
            self.dir.path().join("caches")
        }

        fn write_config(&self, version: &str) {
            let config = format!(
                r#"
[app]
origin = "{}"
version = "{}"
static_assets = ["/", "/app.js"]

[network]
timeout_secs = 2
"#,
                UNREACHABLE_ORIGIN, version
            );
            std::fs::write(self.config_path(), config).unwrap();
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("swcache");
            cmd.current_dir(self.dir.path())
                .arg("--no-local")
                .arg("--config")
                .arg(self.config_path())
                .arg("--storage")
                .arg(self.storage_path())
                .env_remove("SWCACHE_CONFIG")
                .env_remove("SWCACHE_STORAGE");
            cmd
        }

        fn install(&self) {
            self.cmd().arg("install").assert().success();
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("swcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline-first cache manager"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("swcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }

    #[test]
    fn install_survives_unreachable_assets() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached 0 of 2 asset(s) in html-static-v1"))
            .stdout(predicate::str::contains("v1 active"));
    }

    #[test]
    fn status_reports_active_version() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No active worker"));

        sandbox.install();
        sandbox
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Worker v1 is active"));
    }

    #[test]
    fn fetch_requires_install() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["fetch", "/", "--offline"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No active worker"))
            .stderr(predicate::str::contains("swcache install"));
    }

    #[test]
    fn offline_fetch_returns_synthetic_response() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["fetch", "/data.json", "--offline"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline - content not available"))
            .stderr(predicate::str::contains("503"));
    }

    #[test]
    fn fetch_writes_body_to_file() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        let out = sandbox.path().join("body.txt");
        sandbox
            .cmd()
            .args(["fetch", "/missing", "--offline", "--output"])
            .arg(&out)
            .assert()
            .success();
        let body = std::fs::read_to_string(out).unwrap();
        assert_eq!(body, "Offline - content not available");
    }

    #[test]
    fn version_bump_deletes_stale_caches() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();

        sandbox.write_config("v2");
        sandbox
            .cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted stale cache (html-static-v1)"));

        sandbox
            .cmd()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("html-static-v2"))
            .stdout(predicate::str::contains("html-static-v1").not());
    }

    #[test]
    fn cache_list_json() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"html-static-v1\""))
            .stdout(predicate::str::contains("\"current\": true"));
    }

    #[test]
    fn cache_clear_with_yes() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted 1 cache(s)"));
        sandbox
            .cmd()
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No caches found"));
    }

    #[test]
    fn cache_show_unknown() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["cache", "show", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope"));
    }

    #[test]
    fn push_shows_notification_and_opens_window() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["push", r#"{"title":"Hello"}"#, "--click", "open"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Hello"))
            .stdout(predicate::str::contains("New content available"))
            .stdout(predicate::str::contains("Opened window"));
    }

    #[test]
    fn malformed_push_is_ignored() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["push", "not json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Push ignored"));
    }

    #[test]
    fn sync_is_acknowledged() {
        let sandbox = Sandbox::new("v1");
        sandbox.install();
        sandbox
            .cmd()
            .args(["sync", "content-refresh", "--periodic"])
            .assert()
            .success()
            .stdout(predicate::str::contains("periodicsync event acknowledged"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[registration]"))
            .stdout(predicate::str::contains(UNREACHABLE_ORIGIN));
    }

    #[test]
    fn config_set_then_show() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["config", "set", "app.cache_prefix", "site"])
            .assert()
            .success();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache_prefix = \"site\""));
    }

    #[test]
    fn config_set_image_fallback_status() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["config", "set", "policy.image_fallback", "408"])
            .assert()
            .success();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("status = 408"));
    }

    #[test]
    fn config_set_rejects_empty_version() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["config", "set", "app.version", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("app.version"));
    }

    #[test]
    fn empty_version_blocks_install() {
        let sandbox = Sandbox::new("");
        sandbox
            .cmd()
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("version must not be empty"));
    }

    #[test]
    fn config_set_unknown_key() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .cmd()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("vm.name"));
    }

    #[test]
    fn local_config_overrides_global() {
        let sandbox = Sandbox::new("v1");
        std::fs::write(sandbox.path().join("swcache.toml"), "[app]\nversion = \"v7\"\n").unwrap();

        let mut cmd = cargo_bin_cmd!("swcache");
        cmd.current_dir(sandbox.path())
            .arg("--config")
            .arg(sandbox.config_path())
            .arg("--storage")
            .arg(sandbox.storage_path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("version = \"v7\""));
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("swcache")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }
}
