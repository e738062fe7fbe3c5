//! Integration tests for suitemap

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn suitemap() -> Command {
        cargo_bin_cmd!("suitemap")
    }

    /// Config file whose cache lives under `temp`
    fn write_config(temp: &Path, extra: &str) -> PathBuf {
        let sources = temp.join("sources");
        std::fs::create_dir_all(&sources).unwrap();
        std::fs::write(sources.join("report.rs"), "// v1").unwrap();

        let path = temp.join("config.toml");
        let content = format!(
            "[cache]\ndir = {:?}\nsource_dir = {:?}\n{}",
            temp.join("cache").display().to_string(),
            sources.display().to_string(),
            extra
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        suitemap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Per-branch test suite maps"));
    }

    #[test]
    fn version_displays() {
        suitemap()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("suitemap"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        suitemap()
            .args(["config", "path"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        suitemap()
            .args(["config", "show"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("[builder]"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        suitemap()
            .args(["config", "init"])
            .env("SUITEMAP_CONFIG", &path)
            .assert()
            .success();
        assert!(path.exists());
    }

    #[test]
    fn invalid_config_shows_hint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nenabled = 3\n").unwrap();
        suitemap()
            .args(["cache", "path"])
            .arg("--config")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn cache_path_follows_config() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        suitemap()
            .args(["cache", "path"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("cache"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        suitemap()
            .args(["cache", "list"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached reports found."));
    }

    #[test]
    fn show_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        suitemap()
            .arg("show")
            .arg(temp.path().join("missing"))
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn show_outside_repository_fails() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let plain = temp.path().join("plain");
        std::fs::create_dir_all(&plain).unwrap();

        suitemap()
            .arg("show")
            .arg(&plain)
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn branches_requires_pattern() {
        suitemap().arg("branches").assert().failure();
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let output = std::process::Command::new("git")
            .args(["-c", "user.name=suitemap", "-c", "user.email=suitemap@localhost"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?}", args);
    }

    const FIXTURE: &str = r#"[
        {"path": "net", "description": "network", "specs": [{"name": "pings"}, {"name": "resolves"}]},
        {"path": "storage", "specs": [{"name": "mounts"}]}
    ]"#;

    /// Clone of an upstream repository holding a canned dry-run report
    fn clone_with_fixture(temp: &Path) -> PathBuf {
        let upstream = temp.join("upstream");
        std::fs::create_dir_all(&upstream).unwrap();
        git(&upstream, &["init", "--quiet"]);
        std::fs::write(upstream.join("fixture.json"), FIXTURE).unwrap();
        std::fs::write(upstream.join(".gitignore"), "suitemap-report.json\n").unwrap();
        git(&upstream, &["add", "fixture.json", ".gitignore"]);
        git(&upstream, &["commit", "--quiet", "-m", "fixture"]);

        let clone = temp.join("clone");
        let url = upstream.display().to_string();
        git(temp, &["clone", "--quiet", url.as_str(), "clone"]);
        clone
    }

    #[cfg(unix)]
    #[test]
    fn show_builds_then_reuses_cached_report() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let clone = clone_with_fixture(temp.path());

        let building = write_config(
            temp.path(),
            "[builder]\ncommand = [\"cp\", \"fixture.json\", \"suitemap-report.json\"]\n",
        );
        suitemap()
            .arg("show")
            .arg(&clone)
            .arg("--config")
            .arg(&building)
            .assert()
            .success()
            .stdout(predicate::str::contains("net [2] network"))
            .stdout(predicate::str::contains("storage [1]"));

        suitemap()
            .args(["cache", "list", "--format", "plain"])
            .arg("--config")
            .arg(&building)
            .assert()
            .success()
            .stdout(predicate::str::contains(".json.zstd"));

        // A failing builder proves the second run is served from the cache
        let failing = write_config(temp.path(), "[builder]\ncommand = [\"false\"]\n");
        suitemap()
            .args(["show", "--leaves", "--format", "json"])
            .arg(&clone)
            .arg("--config")
            .arg(&failing)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"spec_count\": 3"))
            .stdout(predicate::str::contains("pings"));
    }

    #[cfg(unix)]
    #[test]
    fn cache_clear_removes_reports() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let clone = clone_with_fixture(temp.path());
        let config = write_config(
            temp.path(),
            "[builder]\ncommand = [\"cp\", \"fixture.json\", \"suitemap-report.json\"]\n",
        );

        suitemap()
            .arg("show")
            .arg(&clone)
            .arg("--config")
            .arg(&config)
            .assert()
            .success();

        suitemap()
            .args(["cache", "clear", "--yes"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success();

        suitemap()
            .args(["cache", "list"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached reports found."));
    }
}
