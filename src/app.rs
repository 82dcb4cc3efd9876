use std::io;

use anyhow::Result;
use tracing::instrument;

use crate::cli::{Command, FakeArgs, LogLevel, OutputFormat, SessionOptions};
use crate::session::StreamSession;
use crate::stream::{BridgeController, FakeBridgeController};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};

/// Creates a bridge controller backed by the fixture-driven fake transport.
#[must_use]
pub fn fake_bridge_controller(fake_args: FakeArgs) -> Box<dyn BridgeController> {
    Box::new(FakeBridgeController::new(fake_args.into_backend_config()))
}

/// Runs the CLI command with an injected transport.
///
/// ```
/// # async fn demo() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// let args = luxcast::Args::try_parse_from([
///     "luxcast",
///     "--fake",
///     "--fake-bridge",
///     "bridge-1|10.0.0.2|user|key",
///     "--fake-groups",
///     "200:1,2,3",
///     "status",
/// ])?;
/// let (command, options, fake_args) = args.into_command_and_backend()?;
/// let controller = luxcast::fake_bridge_controller(fake_args);
/// let mut out = Vec::new();
/// luxcast::run(command, options, &mut out, controller, luxcast::OutputFormat::Json).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a lifecycle operation
/// fails, or output writing fails.
pub async fn run<W>(
    command: Command,
    options: SessionOptions,
    out: &mut W,
    controller: Box<dyn BridgeController>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_log_level(command, options, out, controller, None, output_format).await
}

/// Runs the CLI command with an explicit telemetry log-level override.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a lifecycle operation
/// fails, or output writing fails.
pub async fn run_with_log_level<W>(
    command: Command,
    options: SessionOptions,
    out: &mut W,
    controller: Box<dyn BridgeController>,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(
        command,
        options,
        out,
        &SystemTerminalClient,
        controller,
        log_level,
        output_format,
    )
    .await
}

/// Runs the CLI command with injected clients and explicit telemetry
/// settings.
///
/// ```
/// # async fn demo() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl luxcast::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = luxcast::Args::try_parse_from([
///     "luxcast",
///     "--log-level",
///     "debug",
///     "--fake",
///     "--fake-bridge",
///     "bridge-1|10.0.0.2|user|key",
///     "--fake-groups",
///     "200:1,2,3",
///     "lights",
/// ])?;
/// let log_level = args.log_level();
/// let (command, options, fake_args) = args.into_command_and_backend()?;
/// let controller = luxcast::fake_bridge_controller(fake_args);
/// let mut out = Vec::new();
/// luxcast::run_with_clients_and_log_level(
///     command,
///     options,
///     &mut out,
///     &FakeTerminal,
///     controller,
///     log_level,
///     luxcast::OutputFormat::Json,
/// ).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a lifecycle operation
/// fails, or output writing fails.
#[instrument(
    skip(options, out, terminal_client, controller),
    level = "info",
    fields(command = %command_name(&command), ?log_level)
)]
pub async fn run_with_clients_and_log_level<W>(
    command: Command,
    options: SessionOptions,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    controller: Box<dyn BridgeController>,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(
        "luxcast",
        terminal_client.stderr_is_terminal(),
        log_level.map(LogLevel::as_level_filter),
    )?;

    let session = StreamSession::new(controller);
    match command {
        Command::Status => crate::cli::status::run(&session, &options, out, output_format).await,
        Command::Lights => crate::cli::lights::run(&session, &options, out, output_format).await,
        Command::Set(args) => {
            crate::cli::set::run(&session, &options, &args, out, output_format).await
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Status => "status",
        Command::Lights => "lights",
        Command::Set(_args) => "set",
    }
}
