use std::time::Duration;

use bon::Builder;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

use crate::cli::set::SetArgs;
use crate::error::CliConfigError;
use crate::session::{BridgeDescriptor, DEFAULT_CONNECT_TIMEOUT};
use crate::stream::{FakeBridgeConfig, GroupTable};

/// Command-line options for the streaming light controller.
#[derive(Debug, Parser)]
#[command(
    name = "luxcast",
    about = "Stream low-latency colour updates to entertainment lighting groups."
)]
pub struct Args {
    /// Uses the fake bridge transport with fixture-driven behaviour.
    #[arg(long, global = true)]
    fake: bool,
    /// Fake bridge credentials in the form `bridge_id|address|username|client_key`.
    #[arg(long, global = true, requires = "fake", required_if_eq("fake", "true"))]
    fake_bridge: Option<BridgeDescriptor>,
    /// Fake entertainment groups in the form `id:fixture,fixture,...;id:...`.
    #[arg(long, global = true, requires = "fake", required_if_eq("fake", "true"))]
    fake_groups: Option<GroupTable>,
    /// Artificial fake handshake delay (e.g. `250ms`, `2s`).
    #[arg(long, global = true, requires = "fake", value_parser = parse_duration)]
    fake_connect_delay: Option<Duration>,
    /// Disables the fake transport's auto-start-on-group-select policy.
    #[arg(long, global = true, requires = "fake")]
    fake_manual_start: bool,
    /// Bridge credentials to connect with, in the same record form as
    /// `--fake-bridge`. Defaults to the fake bridge's own record in fake mode.
    #[arg(long, global = true)]
    bridge: Option<BridgeDescriptor>,
    /// Entertainment group to select. Defaults to the bridge's default group.
    #[arg(long, global = true)]
    group: Option<String>,
    /// Bound on the connect handshake (e.g. `10s`).
    #[arg(long, global = true, value_parser = parse_duration)]
    connect_timeout: Option<Duration>,
    /// Application name registered with the bridge.
    #[arg(long, global = true, default_value = "luxcast")]
    app_name: String,
    /// Device name registered with the bridge.
    #[arg(long, global = true, default_value = "luxcast-cli")]
    device_name: String,
    /// Telemetry log-level override.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format. Defaults to pretty on a terminal and JSON otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Creates argument values directly without CLI parsing.
    ///
    /// ```
    /// use luxcast::{Args, Command};
    ///
    /// let status = Args::new(Command::Status);
    /// let _ = status;
    /// ```
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            fake: false,
            fake_bridge: None,
            fake_groups: None,
            fake_connect_delay: None,
            fake_manual_start: false,
            bridge: None,
            group: None,
            connect_timeout: None,
            app_name: "luxcast".to_string(),
            device_name: "luxcast-cli".to_string(),
            log_level: None,
            output: None,
            command,
        }
    }

    /// Enables fake transport mode with pre-parsed fake configuration.
    #[must_use]
    pub fn with_fake(mut self, fake: FakeArgs) -> Self {
        let FakeArgs {
            bridge,
            groups,
            connect_delay,
            manual_start,
        } = fake;

        self.fake = true;
        self.fake_bridge = Some(bridge);
        self.fake_groups = Some(groups);
        self.fake_connect_delay = Some(connect_delay);
        self.fake_manual_start = manual_start;
        self
    }

    /// Overrides the entertainment group to select.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Overrides the connect handshake bound.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Returns the requested telemetry log level, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Returns the requested output format, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    /// Splits parsed CLI arguments into the command, the session options and
    /// the fake-transport settings.
    ///
    /// # Errors
    ///
    /// Returns an error when no transport backend is configured or the fake
    /// fixtures are incomplete.
    pub fn into_command_and_backend(
        self,
    ) -> anyhow::Result<(Command, SessionOptions, FakeArgs)> {
        let Args {
            fake,
            fake_bridge,
            fake_groups,
            fake_connect_delay,
            fake_manual_start,
            bridge,
            group,
            connect_timeout,
            app_name,
            device_name,
            log_level: _,
            output: _,
            command,
        } = self;

        if !fake {
            return Err(CliConfigError::MissingTransportBackend.into());
        }
        let Some(fake_bridge) = fake_bridge else {
            return Err(CliConfigError::MissingFakeBridgeFixture.into());
        };
        let Some(fake_groups) = fake_groups else {
            return Err(CliConfigError::MissingFakeGroupFixture.into());
        };

        let options = SessionOptions::builder()
            .bridge(bridge.unwrap_or_else(|| fake_bridge.clone()))
            .maybe_group(group)
            .maybe_connect_timeout(connect_timeout)
            .app_name(app_name)
            .device_name(device_name)
            .build();
        let fake_args = FakeArgs {
            bridge: fake_bridge,
            groups: fake_groups,
            connect_delay: fake_connect_delay.unwrap_or(Duration::ZERO),
            manual_start: fake_manual_start,
        };

        Ok((command, options, fake_args))
    }
}

/// Fake transport arguments for programmatic runs.
#[derive(Debug, Builder)]
pub struct FakeArgs {
    #[builder(with = |value: &str| -> Result<_, crate::FixtureError> { value.parse() })]
    bridge: BridgeDescriptor,
    #[builder(with = |value: &str| -> Result<_, crate::FixtureError> { value.parse() })]
    groups: GroupTable,
    #[builder(default)]
    connect_delay: Duration,
    #[builder(default)]
    manual_start: bool,
}

impl FakeArgs {
    pub(crate) fn into_backend_config(self) -> FakeBridgeConfig {
        let Self {
            bridge,
            groups,
            connect_delay,
            manual_start,
        } = self;

        FakeBridgeConfig::builder()
            .bridge(bridge)
            .groups(groups)
            .connect_delay(connect_delay)
            .auto_start(!manual_start)
            .build()
    }
}

/// Session options resolved from the CLI surface.
#[derive(Debug, Clone, Builder)]
pub struct SessionOptions {
    bridge: BridgeDescriptor,
    group: Option<String>,
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    connect_timeout: Duration,
    #[builder(default = "luxcast".to_string())]
    app_name: String,
    #[builder(default = "luxcast-cli".to_string())]
    device_name: String,
}

impl SessionOptions {
    /// Returns the bridge credentials to connect with.
    #[must_use]
    pub fn bridge(&self) -> &BridgeDescriptor {
        &self.bridge
    }

    /// Returns the entertainment group to select, if one was named.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the bound on the connect handshake.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the application name registered with the bridge.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the device name registered with the bridge.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialise and connect, then print the session status record.
    Status,
    /// Connect and select the entertainment group, then print its fixture ids.
    Lights,
    /// Run the full lifecycle and apply one colour update.
    Set(SetArgs),
}

/// Telemetry log level selectable from the CLI.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub(crate) fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output rendering selected for a run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-oriented lines.
    Pretty,
    /// One pretty-printed JSON document per result.
    Json,
}

pub(crate) fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|error| error.to_string())
}
