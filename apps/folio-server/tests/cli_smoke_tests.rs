//! CLI smoke tests for the folio-server binary.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Run the binary with an isolated home directory and no provider keys.
fn run_folio_server(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_folio-server"))
        .args(args)
        .env("HOME", home)
        .env("APPDATA", home)
        .env_remove("SUPABASE_KEY")
        .env_remove("XAI_API_KEY")
        .env_remove("GOOGLE_GENERATIVE_AI_API_KEY")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute folio-server")
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let home = dir.path().join("home");
    let path = dir.path().join("folio.yaml");
    let yaml = format!(
        "server:\n  home_dir: \"{}\"\n  host: \"127.0.0.1\"\n  port: 0\n{body}",
        home.to_string_lossy().replace('\\', "/")
    );
    std::fs::write(&path, yaml).expect("Failed to write config");
    path.to_string_lossy().to_string()
}

#[test]
fn help_lists_commands_and_flags() {
    let tmp = TempDir::new().unwrap();
    let output = run_folio_server(&["--help"], tmp.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for needle in ["run", "check", "--config", "--mock", "--print-config"] {
        assert!(stdout.contains(needle), "help should mention {needle}");
    }
}

#[test]
fn version_prints_binary_name() {
    let tmp = TempDir::new().unwrap();
    let output = run_folio_server(&["--version"], tmp.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("folio-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn unknown_subcommand_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_folio_server(&["invalid-command"], tmp.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn missing_config_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    let output = run_folio_server(&["--config", "/nonexistent/folio.yaml", "check"], tmp.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn invalid_yaml_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("invalid.yaml");
    std::fs::write(&path, "invalid: yaml: content: [unclosed").unwrap();

    let output = run_folio_server(&["--config", path.to_str().unwrap(), "check"], tmp.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config"), "{stderr}");
}

#[test]
fn check_without_provider_keys_names_the_variable() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let output = run_folio_server(&["--config", &config, "check"], tmp.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SUPABASE_KEY"), "{stderr}");
}

#[test]
fn check_in_mock_mode_passes() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "modules:\n  profiles:\n    avatar_paths: random_suffix\n");
    let output = run_folio_server(&["--config", &config, "--mock", "check"], tmp.path());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn invalid_module_section_fails_check() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "modules:\n  assistant:\n    bucket: nope\n");
    let output = run_folio_server(&["--config", &config, "--mock", "check"], tmp.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("assistant"), "{stderr}");
}

#[test]
fn print_config_applies_port_override() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let output = run_folio_server(
        &["--config", &config, "--port", "9191", "--print-config"],
        tmp.path(),
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"));
    assert!(stdout.contains("providers:"));
    assert!(!stdout.contains("anon_key:"), "secrets never appear in config");
}
