//! CLI parsing and the route table, driven without spawning the binary.

use clap::Parser;
use tempfile::TempDir;
use varigen::cli::{map_error, Cli, Commands, OutputFormat, RunContext};
use varigen::config::VarigenConfig;

use crate::integration::{with_isolated_env, write_skeleton};

const SKELETON: &str = "\
%% expand ctors single
variant( T${k - 1} const & );
%% end
%% expand visit paired
visit${a}
%% end
";

fn context(dir: &TempDir) -> RunContext {
    write_skeleton(dir.path(), "template/variant.hpp", SKELETON);
    RunContext::with_config(dir.path().to_path_buf(), VarigenConfig::default())
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("varigen").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_generate_then_check() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let check = parse(&["check", "--max-types", "2", "--max-args", "1"]);
    let stale = ctx.execute(&check.command).unwrap();
    assert!(!stale.success);
    assert!(stale.text.starts_with("Missing"));

    let generate = parse(&["generate", "--max-types", "2", "--max-args", "1"]);
    let output = ctx.execute(&generate.command).unwrap();
    assert!(output.success);
    assert!(output.text.contains("max 2 types, max 1 visitor arguments"));

    let written = dir.path().join("include/nonstd/variant.hpp");
    assert_eq!(
        std::fs::read_to_string(written).unwrap(),
        "variant( T0 const & );\nvariant( T1 const & );\nvisit0\nvisit1\n"
    );

    let fresh = ctx.execute(&check.command).unwrap();
    assert!(fresh.success);
    assert!(fresh.text.starts_with("Up to date"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let cli = parse(&[
        "generate",
        "--max-types",
        "3",
        "--max-args",
        "0",
        "--output",
        "out/v.hpp",
        "--format",
        "json",
    ]);
    let output = ctx.execute(&cli.command).unwrap();
    let report: serde_json::Value = serde_json::from_str(&output.text).unwrap();

    assert_eq!(report["params"]["type_count"], 3);
    assert_eq!(report["params"]["visitor_arity"], 0);
    assert_eq!(report["instantiations"], 4);
    assert_eq!(report["markers"][0]["name"], "ctors");
    assert_eq!(report["markers"][1]["axis"], "paired");
    assert!(dir.path().join("out/v.hpp").exists());
}

#[test]
fn test_markers_command_lists_counts() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let cli = parse(&["markers", "--max-types", "5", "--max-args", "2", "--format", "json"]);
    let output = ctx.execute(&cli.command).unwrap();
    let markers: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(markers[0]["instantiations"], 5);
    assert_eq!(markers[1]["instantiations"], 3);
    assert!(!dir.path().join("include/nonstd/variant.hpp").exists());
}

#[test]
fn test_negative_flag_reports_invalid_parameter() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let cli = parse(&["generate", "--max-args", "-2"]);
    let err = ctx.execute(&cli.command).unwrap_err();
    let line = map_error(&err);
    assert!(line.starts_with("error[InvalidParameter]"));
    assert!(line.contains("visitor_arity"));
    assert!(!dir.path().join("include").exists());
}

#[test]
fn test_workspace_config_supplies_defaults() {
    with_isolated_env(|_| {
        let dir = TempDir::new().unwrap();
        write_skeleton(dir.path(), "template/variant.hpp", SKELETON);
        std::fs::write(
            dir.path().join("varigen.toml"),
            "[generation]\nmax_types = 4\nmax_args = 1\n",
        )
        .unwrap();

        let ctx = RunContext::new(dir.path().to_path_buf(), None).unwrap();
        let output = ctx.execute(&parse(&["generate"]).command).unwrap();
        assert!(output.text.contains("max 4 types, max 1 visitor arguments"));

        let flags_win = parse(&["generate", "--max-types", "2"]);
        let output = ctx.execute(&flags_win.command).unwrap();
        assert!(output.text.contains("max 2 types, max 1 visitor arguments"));
    });
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["varigen", "-v", "-q", "generate"]).is_err());
}

#[test]
fn test_unknown_report_format_is_rejected() {
    assert!(Cli::try_parse_from(["varigen", "generate", "--format", "jsn"]).is_err());
    let cli = parse(&["markers", "--format", "json"]);
    match cli.command {
        Commands::Markers { format, .. } => assert_eq!(format, OutputFormat::Json),
        _ => panic!("expected markers"),
    }
}
