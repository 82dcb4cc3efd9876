use std::time::{Duration, Instant};

use clap::Parser;
use clap::error::ErrorKind;
use pretty_assertions::assert_eq;

const FAKE_BRIDGE: &str = "bridge-1|10.0.0.2|stream-user|clientkey";
const FAKE_GROUPS: &str = "200:1,2,3;201:7,8";

#[derive(Debug, Default)]
struct FakeTerminalClient;

impl luxcast::TerminalClient for FakeTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        false
    }

    fn stderr_is_terminal(&self) -> bool {
        false
    }
}

async fn run_with_parsed_args(
    args: luxcast::Args,
    output_format: luxcast::OutputFormat,
) -> anyhow::Result<String> {
    let mut output = Vec::new();
    let log_level = args.log_level();
    let (command, options, fake_args) = args.into_command_and_backend()?;
    let controller = luxcast::fake_bridge_controller(fake_args);
    luxcast::run_with_clients_and_log_level(
        command,
        options,
        &mut output,
        &FakeTerminalClient,
        controller,
        log_level,
        output_format,
    )
    .await?;
    Ok(String::from_utf8(output)?)
}

async fn run_with_argv<const N: usize>(
    argv: [&str; N],
    output_format: luxcast::OutputFormat,
) -> anyhow::Result<String> {
    let parsed_args = luxcast::Args::try_parse_from(argv)?;
    run_with_parsed_args(parsed_args, output_format).await
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("command output should be valid JSON")
}

#[tokio::test]
async fn status_command_reports_a_connected_session() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "status",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let status = parse_json(&stdout);
    assert_eq!(true, status["initialized"]);
    assert_eq!(true, status["connected"]);
    assert_eq!(false, status["streaming"]);
    assert_eq!("connected", status["state"]);
    assert_eq!("luxcast", status["app_name"]);
    assert_eq!("luxcast-cli", status["device_name"]);
    assert_eq!("dtls", status["streaming_mode"]);
    assert_eq!("bridge-1", status["bridge"]["id"]);
    assert_eq!("10.0.0.2", status["bridge"]["ip"]);
    assert!(status.get("selected_group").is_none());
    Ok(())
}

#[tokio::test]
async fn status_with_bad_credentials_reports_disconnected() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "--bridge",
            "bridge-1|10.0.0.2|stream-user|wrong-key",
            "status",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let status = parse_json(&stdout);
    assert_eq!(true, status["initialized"]);
    assert_eq!(false, status["connected"]);
    assert_eq!("initialized", status["state"]);
    assert!(status.get("bridge").is_none());
    Ok(())
}

#[tokio::test]
async fn lights_command_lists_group_fixtures() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "lights",
        ],
        luxcast::OutputFormat::Pretty,
    )
    .await?;

    assert_eq!("1\n2\n3\n", stdout);
    Ok(())
}

#[tokio::test]
async fn lights_command_honours_group_override() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "--group",
            "201",
            "lights",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let result = parse_json(&stdout);
    assert_eq!("201", result["group"]);
    assert_eq!(serde_json::json!(["7", "8"]), result["lights"]);
    Ok(())
}

#[tokio::test]
async fn set_rgb_applies_to_the_whole_group() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "set",
            "rgb",
            "255",
            "0",
            "0",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let receipt = parse_json(&stdout);
    assert_eq!("rgb", receipt["action"]);
    assert_eq!(255, receipt["red"]);
    assert_eq!(0, receipt["green"]);
    assert_eq!(0, receipt["blue"]);
    assert_eq!(1.0, receipt["alpha"]);
    assert_eq!(3, receipt["fixtures_updated"]);
    assert!(receipt.get("fixture").is_none());
    Ok(())
}

#[tokio::test]
async fn set_rgb_addresses_a_single_fixture() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "set",
            "rgb",
            "0",
            "255",
            "0",
            "--light",
            "2",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let receipt = parse_json(&stdout);
    assert_eq!("2", receipt["fixture"]);
    assert_eq!(1, receipt["fixtures_updated"]);
    Ok(())
}

#[tokio::test]
async fn set_ct_reports_a_receipt() -> anyhow::Result<()> {
    let stdout = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "set",
            "ct",
            "300",
            "0.5",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    let receipt = parse_json(&stdout);
    assert_eq!("ct", receipt["action"]);
    assert_eq!(300, receipt["mireds"]);
    assert_eq!(0.5, receipt["brightness"]);
    assert_eq!(3, receipt["fixtures_updated"]);
    Ok(())
}

#[test]
fn set_brightness_rejects_out_of_range_input() {
    let result = luxcast::Args::try_parse_from([
        "luxcast",
        "--fake",
        "--fake-bridge",
        FAKE_BRIDGE,
        "--fake-groups",
        FAKE_GROUPS,
        "set",
        "brightness",
        "1.5",
    ]);

    let error = result.expect_err("brightness 1.5 should fail command parsing");
    assert_eq!(ErrorKind::ValueValidation, error.kind());
}

#[tokio::test]
async fn set_against_unknown_group_fails() -> anyhow::Result<()> {
    let result = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "--group",
            "999",
            "set",
            "rgb",
            "1",
            "2",
            "3",
        ],
        luxcast::OutputFormat::Json,
    )
    .await;

    let error = result.expect_err("an unknown group should fail the run");
    assert!(error.to_string().contains("rejected entertainment group"));
    Ok(())
}

#[tokio::test]
async fn set_without_auto_start_reports_not_ready() -> anyhow::Result<()> {
    let result = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "--fake-manual-start",
            "set",
            "rgb",
            "1",
            "2",
            "3",
        ],
        luxcast::OutputFormat::Json,
    )
    .await;

    let error = result.expect_err("a manual-start transport should refuse the colour update");
    assert!(error.to_string().contains("not streaming yet"));
    Ok(())
}

#[tokio::test]
async fn status_command_applies_fake_connect_delay() -> anyhow::Result<()> {
    let started_at = Instant::now();
    let _ = run_with_argv(
        [
            "luxcast",
            "--fake",
            "--fake-bridge",
            FAKE_BRIDGE,
            "--fake-groups",
            FAKE_GROUPS,
            "--fake-connect-delay",
            "40ms",
            "status",
        ],
        luxcast::OutputFormat::Json,
    )
    .await?;

    assert!(started_at.elapsed() >= Duration::from_millis(40));
    Ok(())
}

#[test]
fn fake_args_builder_rejects_malformed_bridge_fixture() {
    let result = luxcast::FakeArgs::builder().bridge("invalid-record");
    assert!(matches!(
        result,
        Err(luxcast::FixtureError::InvalidRecordFieldCount)
    ));
}

#[tokio::test]
async fn programmatic_args_drive_a_full_set_run() -> anyhow::Result<()> {
    let fake = luxcast::FakeArgs::builder()
        .bridge(FAKE_BRIDGE)?
        .groups(FAKE_GROUPS)?
        .build();
    let args = luxcast::Args::new(luxcast::Command::Set(luxcast::SetArgs::new(
        luxcast::SetAction::Brightness(luxcast::BrightnessArgs::new(0.25).with_light("7")),
    )))
    .with_fake(fake)
    .with_group("201");

    let stdout = run_with_parsed_args(args, luxcast::OutputFormat::Json).await?;
    let receipt = parse_json(&stdout);
    assert_eq!("brightness", receipt["action"]);
    assert_eq!(0.25, receipt["value"]);
    assert_eq!("7", receipt["fixture"]);
    assert_eq!(1, receipt["fixtures_updated"]);
    Ok(())
}
