//! CLI surface: argument validation happens before any remote call.

use assert_cmd::Command;
use clap::Parser;
use edgeward::cli::{Cli, Commands};
use predicates::prelude::*;

#[test]
fn provision_accepts_percent_bounds() {
    for percent in ["0", "100"] {
        let cli = Cli::try_parse_from([
            "edgeward",
            "provision",
            "--site",
            "shop.example.com",
            "--service-id",
            "SID1",
            "--percent",
            percent,
        ])
        .expect("bounds are valid");
        match cli.command {
            Commands::Provision(args) => assert_eq!(args.percent.to_string(), percent),
            _ => panic!("expected provision subcommand"),
        }
    }
}

#[test]
fn provision_rejects_percent_out_of_range() {
    let result = Cli::try_parse_from([
        "edgeward",
        "provision",
        "--site",
        "shop.example.com",
        "--service-id",
        "SID1",
        "--percent",
        "101",
    ]);
    assert!(result.is_err());
}

#[test]
fn provision_site_conflicts_with_file() {
    let result = Cli::try_parse_from([
        "edgeward",
        "provision",
        "--site",
        "shop.example.com",
        "--file",
        "sites.csv",
        "--percent",
        "10",
    ]);
    assert!(result.is_err());
}

#[test]
fn sync_subcommand_is_registered() {
    let cli = Cli::try_parse_from(["edgeward", "sync", "--site", "a", "--service-id", "b"])
        .expect("sync parses");
    assert!(matches!(cli.command, Commands::Sync(_)));
}

#[test]
fn provision_requires_percent() {
    Command::cargo_bin("edgeward")
        .unwrap()
        .args(["provision", "--site", "a", "--service-id", "b"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn check_config_reports_valid_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("edgeward.toml");
    std::fs::write(
        &config,
        r#"
        [api]
        base_url = "https://dashboard.example.com/api/v0"
        corp = "acme"
        "#,
    )
    .unwrap();

    Command::cargo_bin("edgeward")
        .unwrap()
        .args(["check", "config", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration is valid"));
}

#[test]
fn check_config_rejects_bad_agent_level() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("edgeward.toml");
    std::fs::write(
        &config,
        r#"
        [site_defaults]
        agent_level = "obliterate"
        "#,
    )
    .unwrap();

    Command::cargo_bin("edgeward")
        .unwrap()
        .args(["check", "config", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn provision_without_credentials_fails_before_any_remote_call() {
    Command::cargo_bin("edgeward")
        .unwrap()
        .env_remove("EDGEWARD_USER_EMAIL")
        .env_remove("EDGEWARD_API_TOKEN")
        .env_remove("EDGEWARD_PROVIDER_TOKEN")
        .env_remove("EDGEWARD_CORP")
        .args([
            "provision",
            "--corp",
            "acme",
            "--site",
            "shop.example.com",
            "--service-id",
            "SID1",
            "--percent",
            "10",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing required field"));
}
