use std::io;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Subcommand;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::instrument;

use crate::cli::command::{OutputFormat, SessionOptions, parse_duration};
use crate::cli::write_json_line;
use crate::colour::Colour;
use crate::session::{ColourTarget, StartOutcome, StreamSession};

/// JSON result emitted by a `set` action.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SetReceipt {
    Rgb {
        red: u8,
        green: u8,
        blue: u8,
        alpha: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixture: Option<String>,
        fixtures_updated: usize,
    },
    Xy {
        x: f64,
        y: f64,
        brightness: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixture: Option<String>,
        fixtures_updated: usize,
    },
    Ct {
        mireds: u32,
        brightness: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixture: Option<String>,
        fixtures_updated: usize,
    },
    Brightness {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixture: Option<String>,
        fixtures_updated: usize,
    },
}

/// Arguments for the `set` command.
#[derive(Debug, clap::Args)]
pub struct SetArgs {
    #[command(subcommand)]
    action: SetAction,
}

impl SetArgs {
    /// Creates set arguments for one action.
    ///
    /// ```
    /// use luxcast::{RgbArgs, SetAction, SetArgs};
    ///
    /// let args = SetArgs::new(SetAction::Rgb(RgbArgs::new(255, 0, 0)));
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(action: SetAction) -> Self {
        Self { action }
    }
}

/// Colour update performed by the `set` command.
#[derive(Debug, Subcommand)]
pub enum SetAction {
    /// Apply an RGB colour (8-bit channels).
    Rgb(RgbArgs),
    /// Apply a CIE 1931 xy chromaticity plus brightness.
    Xy(XyArgs),
    /// Apply a colour temperature in mireds plus brightness.
    Ct(CtArgs),
    /// Apply a brightness-only white level.
    Brightness(BrightnessArgs),
}

impl SetAction {
    fn target_args(&self) -> &TargetArgs {
        match self {
            Self::Rgb(args) => &args.target,
            Self::Xy(args) => &args.target,
            Self::Ct(args) => &args.target,
            Self::Brightness(args) => &args.target,
        }
    }
}

/// Addressing shared by every `set` action.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Address a single fixture instead of the whole group.
    #[arg(long)]
    light: Option<String>,
    /// Keep the stream running for this long before teardown (e.g. `2s`).
    #[arg(long, value_parser = parse_duration)]
    hold: Option<Duration>,
}

impl TargetArgs {
    fn colour_target(&self) -> ColourTarget {
        match &self.light {
            Some(fixture_id) => ColourTarget::Fixture(fixture_id.clone()),
            None => ColourTarget::Group,
        }
    }
}

/// Arguments for `set rgb`.
#[derive(Debug, clap::Args)]
pub struct RgbArgs {
    red: u8,
    green: u8,
    blue: u8,
    /// Blend factor in `0.0..=1.0`; defaults to fully opaque.
    #[arg(long, value_parser = parse_unit_interval)]
    alpha: Option<f64>,
    #[command(flatten)]
    target: TargetArgs,
}

impl RgbArgs {
    /// Creates RGB arguments addressing the whole group.
    ///
    /// ```
    /// use luxcast::RgbArgs;
    ///
    /// let args = RgbArgs::new(255, 127, 0);
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: None,
            target: TargetArgs::default(),
        }
    }

    /// Sets the blend factor.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Addresses a single fixture instead of the whole group.
    #[must_use]
    pub fn with_light(mut self, fixture_id: impl Into<String>) -> Self {
        self.target.light = Some(fixture_id.into());
        self
    }
}

/// Arguments for `set xy`.
#[derive(Debug, clap::Args)]
pub struct XyArgs {
    #[arg(value_parser = parse_unit_interval)]
    x: f64,
    #[arg(value_parser = parse_unit_interval)]
    y: f64,
    #[arg(value_parser = parse_unit_interval)]
    brightness: f64,
    #[command(flatten)]
    target: TargetArgs,
}

impl XyArgs {
    /// Creates xy arguments addressing the whole group.
    #[must_use]
    pub fn new(x: f64, y: f64, brightness: f64) -> Self {
        Self {
            x,
            y,
            brightness,
            target: TargetArgs::default(),
        }
    }

    /// Addresses a single fixture instead of the whole group.
    #[must_use]
    pub fn with_light(mut self, fixture_id: impl Into<String>) -> Self {
        self.target.light = Some(fixture_id.into());
        self
    }
}

/// Arguments for `set ct`.
#[derive(Debug, clap::Args)]
pub struct CtArgs {
    /// Colour temperature in mireds (153..=500).
    mireds: u32,
    #[arg(value_parser = parse_unit_interval)]
    brightness: f64,
    #[command(flatten)]
    target: TargetArgs,
}

impl CtArgs {
    /// Creates colour-temperature arguments addressing the whole group.
    #[must_use]
    pub fn new(mireds: u32, brightness: f64) -> Self {
        Self {
            mireds,
            brightness,
            target: TargetArgs::default(),
        }
    }

    /// Addresses a single fixture instead of the whole group.
    #[must_use]
    pub fn with_light(mut self, fixture_id: impl Into<String>) -> Self {
        self.target.light = Some(fixture_id.into());
        self
    }
}

/// Arguments for `set brightness`.
#[derive(Debug, clap::Args)]
pub struct BrightnessArgs {
    #[arg(value_parser = parse_unit_interval)]
    value: f64,
    #[command(flatten)]
    target: TargetArgs,
}

impl BrightnessArgs {
    /// Creates brightness arguments addressing the whole group.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            target: TargetArgs::default(),
        }
    }

    /// Addresses a single fixture instead of the whole group.
    #[must_use]
    pub fn with_light(mut self, fixture_id: impl Into<String>) -> Self {
        self.target.light = Some(fixture_id.into());
        self
    }
}

/// Executes the `set` command: full lifecycle, one colour update, teardown.
#[instrument(skip(session, options, args, out), level = "info", fields(action = ?args.action, ?output_format))]
pub(crate) async fn run<W>(
    session: &StreamSession,
    options: &SessionOptions,
    args: &SetArgs,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let command_result = run_with_session(session, options, args, out, output_format).await;
    session.stop();
    session.shutdown().await;
    command_result
}

async fn run_with_session<W>(
    session: &StreamSession,
    options: &SessionOptions,
    args: &SetArgs,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    session.initialize(options.app_name(), options.device_name())?;
    let connect_result = session
        .connect_with_timeout(options.bridge().clone(), options.connect_timeout())
        .await?;
    if !connect_result.is_connected() {
        bail!("bridge refused the streaming session ({connect_result})");
    }

    session.select_group(options.group()).await?;
    match session.start().await? {
        StartOutcome::Streaming => {}
        StartOutcome::NotReady => {
            bail!("the bridge is not streaming yet; group selection did not auto-start")
        }
    }

    let target = args.action.target_args().colour_target();
    let fixture = match &target {
        ColourTarget::Fixture(fixture_id) => Some(fixture_id.clone()),
        ColourTarget::Group => None,
    };

    let receipt = match &args.action {
        SetAction::Rgb(rgb) => {
            let alpha = rgb.alpha.unwrap_or(1.0);
            let colour = Colour::from_rgba8(rgb.red, rgb.green, rgb.blue, alpha);
            let fixtures_updated = session.set_colour(&target, colour)?;
            SetReceipt::Rgb {
                red: rgb.red,
                green: rgb.green,
                blue: rgb.blue,
                alpha,
                fixture,
                fixtures_updated,
            }
        }
        SetAction::Xy(xy) => {
            let colour = Colour::from_xy(xy.x, xy.y, xy.brightness).map_err(crate::SessionError::from)?;
            let fixtures_updated = session.set_colour(&target, colour)?;
            SetReceipt::Xy {
                x: xy.x,
                y: xy.y,
                brightness: xy.brightness,
                fixture,
                fixtures_updated,
            }
        }
        SetAction::Ct(ct) => {
            let colour =
                Colour::from_mireds(ct.mireds, ct.brightness).map_err(crate::SessionError::from)?;
            let fixtures_updated = session.set_colour(&target, colour)?;
            SetReceipt::Ct {
                mireds: ct.mireds,
                brightness: ct.brightness,
                fixture,
                fixtures_updated,
            }
        }
        SetAction::Brightness(brightness) => {
            let fixtures_updated = session.set_brightness(&target, brightness.value)?;
            SetReceipt::Brightness {
                value: brightness.value,
                fixture,
                fixtures_updated,
            }
        }
    };

    match output_format {
        OutputFormat::Pretty => write_pretty_receipt(out, &receipt)?,
        OutputFormat::Json => write_json_line(out, &receipt)?,
    }

    if let Some(hold) = args.action.target_args().hold {
        tokio::time::sleep(hold).await;
    }

    Ok(())
}

fn write_pretty_receipt(out: &mut impl io::Write, receipt: &SetReceipt) -> Result<()> {
    let tick = "✓".green().to_string();
    match receipt {
        SetReceipt::Rgb {
            red,
            green,
            blue,
            alpha,
            fixture,
            fixtures_updated,
        } => writeln!(
            out,
            "{tick} Applied #{red:02X}{green:02X}{blue:02X} (alpha {alpha:.2}) to {}",
            describe_target(fixture.as_deref(), *fixtures_updated),
        )?,
        SetReceipt::Xy {
            x,
            y,
            brightness,
            fixture,
            fixtures_updated,
        } => writeln!(
            out,
            "{tick} Applied xy ({x:.3}, {y:.3}) at brightness {brightness:.2} to {}",
            describe_target(fixture.as_deref(), *fixtures_updated),
        )?,
        SetReceipt::Ct {
            mireds,
            brightness,
            fixture,
            fixtures_updated,
        } => writeln!(
            out,
            "{tick} Applied {mireds} mireds at brightness {brightness:.2} to {}",
            describe_target(fixture.as_deref(), *fixtures_updated),
        )?,
        SetReceipt::Brightness {
            value,
            fixture,
            fixtures_updated,
        } => writeln!(
            out,
            "{tick} Applied brightness {value:.2} to {}",
            describe_target(fixture.as_deref(), *fixtures_updated),
        )?,
    }
    Ok(())
}

fn describe_target(fixture: Option<&str>, fixtures_updated: usize) -> String {
    match fixture {
        Some(fixture_id) => format!("fixture {fixture_id}"),
        None => format!("{fixtures_updated} fixture(s)"),
    }
}

fn parse_unit_interval(value: &str) -> Result<f64, String> {
    let parsed = value.parse::<f64>().map_err(|error| error.to_string())?;
    if !parsed.is_finite() || !(0.0..=1.0).contains(&parsed) {
        return Err(format!("{parsed} is outside 0.0..=1.0"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", 0.0)]
    #[case("0.5", 0.5)]
    #[case("1", 1.0)]
    fn unit_interval_accepts_range(#[case] raw: &str, #[case] expected: f64) {
        let parsed = parse_unit_interval(raw).expect("in-range value should parse");
        assert_eq!(expected, parsed);
    }

    #[rstest]
    #[case("1.5")]
    #[case("-0.1")]
    #[case("NaN")]
    #[case("lots")]
    fn unit_interval_rejects_out_of_range(#[case] raw: &str) {
        assert!(parse_unit_interval(raw).is_err());
    }

    #[test]
    fn target_defaults_to_whole_group() {
        let args = RgbArgs::new(1, 2, 3);
        assert_eq!(ColourTarget::Group, args.target.colour_target());
    }

    #[test]
    fn with_light_addresses_one_fixture() {
        let args = RgbArgs::new(1, 2, 3).with_light("7");
        assert_eq!(
            ColourTarget::Fixture("7".to_string()),
            args.target.colour_target()
        );
    }
}
