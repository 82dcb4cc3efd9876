use std::io;

use anyhow::Result;
use tracing::{instrument, warn};

use crate::cli::command::{OutputFormat, SessionOptions};
use crate::cli::write_json_line;
use crate::session::StreamSession;

/// Executes the `status` command.
///
/// A failed handshake is reported in the status record rather than aborting
/// the run; status is queryable in every lifecycle state.
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
    session.initialize(options.app_name(), options.device_name())?;
    if let Err(error) = session
        .connect_with_timeout(options.bridge().clone(), options.connect_timeout())
        .await
    {
        warn!(%error, "bridge connection failed");
    }

    let status = session.status();
    match output_format {
        OutputFormat::Pretty => {
            writeln!(out, "State: {}", status.state())?;
            writeln!(out, "Initialized: {}", yes_no(status.initialized()))?;
            writeln!(out, "Connected: {}", yes_no(status.connected()))?;
            writeln!(out, "Streaming: {}", yes_no(status.streaming()))?;
            writeln!(
                out,
                "Group: {}",
                status.selected_group().unwrap_or("none")
            )?;
            match status.bridge() {
                Some(bridge) => writeln!(
                    out,
                    "Bridge: {} at {} (connected: {}, streaming: {})",
                    bridge.id(),
                    bridge.ip(),
                    yes_no(bridge.connected()),
                    yes_no(bridge.streaming()),
                )?,
                None => writeln!(out, "Bridge: none")?,
            }
        }
        OutputFormat::Json => write_json_line(out, &status)?,
    }

    session.shutdown().await;
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
