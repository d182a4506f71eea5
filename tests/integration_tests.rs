//! Integration tests for botctl
//!
//! Dry-run tests check the exact command line of every alias. The Unix-only
//! tests put stand-in `docker` scripts on disk and run the real executor.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a botctl Command isolated from the caller's BOTCTL_* settings
fn botctl(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("botctl");
    cmd.current_dir(dir.path())
        .env_remove("BOTCTL_COMPOSE")
        .env_remove("BOTCTL_SERVICE")
        .env_remove("BOTCTL_MIGRATION_TOOL")
        .env_remove("RUST_LOG");
    cmd
}

fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn assert_dry_run(args: &[&str], expected: &str) {
    let dir = create_temp_project();
    botctl(&dir)
        .arg("--dry-run")
        .args(args)
        .assert()
        .success()
        .stdout(format!("{}\n", expected));
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_botctl_help_flag() {
        let dir = create_temp_project();
        botctl(&dir).arg("--help").assert().success();
    }

    #[test]
    fn test_botctl_version() {
        let dir = create_temp_project();
        botctl(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_help_alias_lists_every_other_alias() {
        let dir = create_temp_project();
        let assert = botctl(&dir).arg("help").assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

        for alias in [
            "build", "up", "down", "restart", "logs", "migration", "migrate", "shell", "test",
            "clean",
        ] {
            assert!(stdout.contains(alias), "help output is missing '{}'", alias);
        }
        assert!(stdout.contains("name=<text>"));
    }

    #[test]
    fn test_unknown_command_fails() {
        let dir = create_temp_project();
        botctl(&dir).arg("deploy").assert().failure();
    }
}

// =============================================================================
// Alias expansion (dry run)
// =============================================================================

mod expansion {
    use super::*;

    #[test]
    fn test_compose_aliases() {
        assert_dry_run(&["build"], "docker compose build");
        assert_dry_run(&["up"], "docker compose up -d");
        assert_dry_run(&["down"], "docker compose down");
        assert_dry_run(&["restart"], "docker compose restart");
    }

    #[test]
    fn test_logs_is_scoped_to_bot() {
        assert_dry_run(&["logs"], "docker compose logs -f bot");
    }

    #[test]
    fn test_service_aliases() {
        assert_dry_run(&["migrate"], "docker compose exec bot alembic upgrade head");
        assert_dry_run(&["shell"], "docker compose exec bot /bin/bash");
        assert_dry_run(&["test"], "docker compose exec bot pytest");
    }

    #[test]
    fn test_test_passes_extra_args() {
        assert_dry_run(
            &["test", "--", "-k", "split"],
            "docker compose exec bot pytest -k split",
        );
    }

    #[test]
    fn test_clean_runs_two_steps() {
        assert_dry_run(
            &["clean"],
            "docker compose down -v\ndocker system prune -f",
        );
    }

    #[test]
    fn test_migration_make_style_name() {
        assert_dry_run(
            &["migration", "name=add_expenses"],
            "docker compose exec bot alembic revision --autogenerate -m add_expenses",
        );
    }

    #[test]
    fn test_migration_name_flag() {
        assert_dry_run(
            &["migration", "--name", "add family table"],
            "docker compose exec bot alembic revision --autogenerate -m 'add family table'",
        );
    }

    #[test]
    fn test_migration_without_name_fails() {
        let dir = create_temp_project();
        botctl(&dir)
            .args(["--dry-run", "migration"])
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Migration name is required"));
    }

    #[test]
    fn test_migration_with_empty_name_fails() {
        let dir = create_temp_project();
        botctl(&dir)
            .args(["--dry-run", "migration", "name="])
            .assert()
            .code(2);
    }

    #[test]
    fn test_service_override_flag() {
        assert_dry_run(&["--service", "worker", "logs"], "docker compose logs -f worker");
    }

    #[test]
    fn test_compose_file_flag() {
        assert_dry_run(
            &["-f", "compose.dev.yml", "up"],
            "docker compose -f compose.dev.yml up -d",
        );
    }

    #[test]
    fn test_config_file_is_honored() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("botctl.toml"),
            "[compose]\ncommand = [\"docker-compose\"]\nservice = \"app\"\n",
        )
        .unwrap();

        botctl(&dir)
            .args(["--dry-run", "logs"])
            .assert()
            .success()
            .stdout("docker-compose logs -f app\n");
    }

    #[test]
    fn test_env_file_overrides_service() {
        let dir = create_temp_project();
        fs::write(dir.path().join(".env"), "BOTCTL_SERVICE=scheduler\n").unwrap();

        botctl(&dir)
            .args(["--dry-run", "shell"])
            .assert()
            .success()
            .stdout("docker compose exec scheduler /bin/bash\n");
    }

    #[test]
    fn test_env_var_overrides_compose() {
        let dir = create_temp_project();
        botctl(&dir)
            .env("BOTCTL_COMPOSE", "podman compose")
            .args(["--dry-run", "build"])
            .assert()
            .success()
            .stdout("podman compose build\n");
    }
}

// =============================================================================
// Config command
// =============================================================================

mod config_command {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = create_temp_project();
        botctl(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created botctl.toml"));

        let content = fs::read_to_string(dir.path().join("botctl.toml")).unwrap();
        assert!(content.contains("service = \"bot\""));
    }

    #[test]
    fn test_config_init_does_not_overwrite() {
        let dir = create_temp_project();
        fs::write(dir.path().join("botctl.toml"), "[compose]\nservice = \"app\"\n").unwrap();

        botctl(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        let content = fs::read_to_string(dir.path().join("botctl.toml")).unwrap();
        assert_eq!(content, "[compose]\nservice = \"app\"\n");
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();
        botctl(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No botctl.toml found"))
            .stdout(predicate::str::contains("service = \"bot\""));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        fs::write(dir.path().join("botctl.toml"), "[compose]\ncommand = []\n").unwrap();

        botctl(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("compose.command is empty"));
    }

    #[test]
    fn test_invalid_config_fails() {
        let dir = create_temp_project();
        fs::write(dir.path().join("botctl.toml"), "[compose\n").unwrap();

        botctl(&dir)
            .args(["--dry-run", "up"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("botctl.toml"));
    }
}

// =============================================================================
// Execution against stand-in tools
// =============================================================================

#[cfg(unix)]
mod execution {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an executable script that logs its arguments to `calls.log`
    /// and exits with `$FAKE_EXIT` (0 by default).
    fn fake_tool(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let log = dir.join("calls.log");
        fs::write(
            &path,
            format!(
                "#!/bin/sh\necho \"{name} $*\" >> '{}'\nexit ${{FAKE_EXIT:-0}}\n",
                log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn calls(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("calls.log")).unwrap_or_default()
    }

    fn use_fake_tools(dir: &TempDir) {
        let docker = fake_tool(dir.path(), "docker");
        fs::write(
            dir.path().join("botctl.toml"),
            format!(
                "[compose]\ncommand = [\"{d}\", \"compose\"]\n\n[tasks]\nprune = [\"{d}\", \"system\", \"prune\", \"-f\"]\n",
                d = docker.display()
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_logs_invokes_tool_once() {
        let dir = create_temp_project();
        use_fake_tools(&dir);

        botctl(&dir)
            .arg("logs")
            .assert()
            .success()
            .stderr(predicate::str::contains("compose logs -f bot"));

        assert_eq!(calls(&dir), "docker compose logs -f bot\n");
    }

    #[test]
    fn test_migration_name_reaches_tool_unmodified() {
        let dir = create_temp_project();
        use_fake_tools(&dir);

        botctl(&dir)
            .args(["migration", "name=add $HOME; rm -rf *"])
            .assert()
            .success();

        assert_eq!(
            calls(&dir),
            "docker compose exec bot alembic revision --autogenerate -m add $HOME; rm -rf *\n"
        );
    }

    #[test]
    fn test_clean_runs_both_steps_in_order() {
        let dir = create_temp_project();
        use_fake_tools(&dir);

        botctl(&dir).arg("clean").assert().success();

        assert_eq!(
            calls(&dir),
            "docker compose down -v\ndocker system prune -f\n"
        );
    }

    #[test]
    fn test_tool_exit_code_propagates() {
        let dir = create_temp_project();
        use_fake_tools(&dir);

        botctl(&dir).env("FAKE_EXIT", "3").arg("up").assert().code(3);
    }

    #[test]
    fn test_clean_stops_after_failed_step() {
        let dir = create_temp_project();
        use_fake_tools(&dir);

        botctl(&dir).env("FAKE_EXIT", "1").arg("clean").assert().code(1);

        assert_eq!(calls(&dir), "docker compose down -v\n");
    }

    #[test]
    fn test_missing_tool_surfaces_not_found() {
        let dir = create_temp_project();

        botctl(&dir)
            .env("BOTCTL_COMPOSE", "botctl-test-missing-orchestrator compose")
            .arg("build")
            .assert()
            .code(127)
            .stderr(predicate::str::contains(
                "botctl-test-missing-orchestrator: command not found",
            ));
    }

    #[test]
    fn test_missing_tool_is_not_retried() {
        let dir = create_temp_project();

        botctl(&dir)
            .env("BOTCTL_COMPOSE", "botctl-test-missing-orchestrator")
            .arg("clean")
            .assert()
            .code(127)
            .stderr(predicate::str::contains("command not found").count(1));
    }
}
