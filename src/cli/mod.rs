use std::io;

use anyhow::Result;
use serde::Serialize;

pub(crate) mod command;
pub(crate) mod lights;
pub(crate) mod set;
pub(crate) mod status;

pub use self::command::{Args, Command, FakeArgs, LogLevel, OutputFormat, SessionOptions};
pub use self::set::{BrightnessArgs, CtArgs, RgbArgs, SetAction, SetArgs, TargetArgs, XyArgs};

pub(crate) fn write_json_line(out: &mut impl io::Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
