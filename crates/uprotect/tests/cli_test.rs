//! End-to-end tests for the `uprotect` binary: flag parsing, help and
//! completion output, and the exit codes of early failures. No test here
//! reaches a live NVR -- every command fails or finishes before the network.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Scaffolding ─────────────────────────────────────────────────────

/// A `uprotect` invocation sealed off from the host: `UPROTECT_*` vars
/// cleared, config lookup pointed at a path that does not exist.
fn uprotect_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("uprotect");
    cmd.env("HOME", "/tmp/uprotect-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/uprotect-test-nonexistent")
        .env_remove("UPROTECT_PROFILE")
        .env_remove("UPROTECT_NVR")
        .env_remove("UPROTECT_USERNAME")
        .env_remove("UPROTECT_PASSWORD")
        .env_remove("UPROTECT_OUTPUT")
        .env_remove("UPROTECT_INSECURE")
        .env_remove("UPROTECT_TIMEOUT");
    cmd
}

/// Like [`uprotect_cmd`], but reading and writing config under `dir`.
fn uprotect_cmd_in(dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = uprotect_cmd();
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

/// Run `uprotect <args> --help` and require every `needle` in its stdout.
fn assert_help_mentions(args: &[&str], needles: &[&str]) {
    let output = uprotect_cmd().args(args).arg("--help").output().unwrap();
    assert!(output.status.success(), "help for {args:?} exited nonzero");
    let help = String::from_utf8_lossy(&output.stdout).into_owned();
    for needle in needles {
        assert!(
            help.contains(needle),
            "help for {args:?} is missing '{needle}':\n{help}"
        );
    }
}

// ── Invocation basics ───────────────────────────────────────────────

#[test]
fn test_no_args_prints_usage() {
    uprotect_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_top_level_help_lists_command_groups() {
    assert_help_mentions(&[], &["UniFi Protect", "cameras", "sensors", "nvr", "config"]);
}

#[test]
fn test_version_flag() {
    uprotect_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uprotect"));
}

// ── Completions ─────────────────────────────────────────────────────

#[test]
fn test_bash_completion_script() {
    uprotect_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_uprotect"));
}

#[test]
fn test_zsh_completion_script() {
    uprotect_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef uprotect"));
}

#[test]
fn test_fish_completion_script() {
    uprotect_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c uprotect"));
}

// ── Failure modes ───────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand() {
    uprotect_cmd()
        .arg("foobar")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cameras_list_without_config() {
    // No profile and no --nvr: the command dies on configuration before
    // anything is dialed.
    uprotect_cmd()
        .args(["cameras", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::is_match(r"(?i)(config|profile)").unwrap());
}

#[test]
fn test_missing_credentials_exit_code() {
    // An NVR URL alone is not enough; without a username the command must
    // fail with the auth exit code before any network traffic happens.
    uprotect_cmd()
        .args(["--nvr", "https://127.0.0.1:1", "cameras", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::is_match(r"(?i)credentials").unwrap());
}

#[test]
fn test_bad_output_format_rejected() {
    uprotect_cmd()
        .args(["--output", "invalid", "cameras", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::is_match(r"(?i)(invalid|possible values)").unwrap());
}

#[test]
fn test_global_flags_all_parse() {
    // Every global flag at once must clear clap (exit 2 would mean a parse
    // error) and die on the missing NVR config instead.
    uprotect_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "cameras",
            "list",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::is_match(r"(?i)(config|profile)").unwrap());
}

#[test]
fn test_watch_interval_must_be_positive() {
    uprotect_cmd()
        .args(["cameras", "watch", "--interval", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("interval"));
}

// ── Config handling ─────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    // Falls back to the built-in defaults rather than erroring.
    uprotect_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_show_roundtrip() {
    let dir = tempfile::tempdir().unwrap();

    uprotect_cmd_in(dir.path())
        .args(["config", "set", "nvr", "https://10.0.0.5"])
        .assert()
        .success();

    uprotect_cmd_in(dir.path())
        .args(["--output", "yaml", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.5"));
}

#[test]
fn test_config_set_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    uprotect_cmd_in(dir.path())
        .args(["config", "set", "recording", "never"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_set_non_boolean_insecure() {
    let dir = tempfile::tempdir().unwrap();
    uprotect_cmd_in(dir.path())
        .args(["config", "set", "insecure", "maybe"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("insecure"));
}

#[test]
fn test_config_use_unknown_profile() {
    uprotect_cmd()
        .args(["config", "use", "nosuch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_profiles_empty() {
    uprotect_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

// ── Help output per command group ───────────────────────────────────

#[test]
fn test_cameras_help_lists_subcommands() {
    assert_help_mentions(
        &["cameras"],
        &["list", "get", "watch", "snapshot", "thumbnail", "set-recording"],
    );
}

#[test]
fn test_sensors_help_lists_subcommands() {
    assert_help_mentions(&["sensors"], &["list", "watch"]);
}

#[test]
fn test_nvr_help_lists_subcommands() {
    assert_help_mentions(&["nvr"], &["info", "events"]);
}

#[test]
fn test_config_help_lists_subcommands() {
    assert_help_mentions(
        &["config"],
        &["init", "show", "set", "profiles", "use", "set-password"],
    );
}

#[test]
fn test_thumbnail_takes_width_flag() {
    assert_help_mentions(&["cameras", "thumbnail"], &["--width"]);
}

#[test]
fn test_nvr_events_takes_last_flag() {
    assert_help_mentions(&["nvr", "events"], &["--last"]);
}
