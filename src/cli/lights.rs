use std::io;

use anyhow::Result;
use serde::Serialize;
use tracing::instrument;

use crate::cli::command::{OutputFormat, SessionOptions};
use crate::cli::write_json_line;
use crate::session::StreamSession;

/// JSON result emitted by the `lights` command.
#[derive(Serialize)]
struct LightsResult {
    group: String,
    lights: Vec<String>,
}

/// Executes the `lights` command.
#[instrument(skip(session, options, out), level = "info", fields(?output_format))]
pub(crate) async fn run<W>(
    session: &StreamSession,
    options: &SessionOptions,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let command_result = run_with_session(session, options, out, output_format).await;
    session.shutdown().await;
    command_result
}

async fn run_with_session<W>(
    session: &StreamSession,
    options: &SessionOptions,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    session.initialize(options.app_name(), options.device_name())?;
    session
        .connect_with_timeout(options.bridge().clone(), options.connect_timeout())
        .await?;
    session.select_group(options.group()).await?;

    let lights = session.light_ids()?;
    match output_format {
        OutputFormat::Pretty => {
            for fixture_id in &lights {
                writeln!(out, "{fixture_id}")?;
            }
        }
        OutputFormat::Json => {
            let group = session
                .status()
                .selected_group()
                .unwrap_or_default()
                .to_string();
            write_json_line(out, &LightsResult { group, lights })?;
        }
    }

    Ok(())
}
