mod app;
mod cli;
mod colour;
mod error;
mod mixer;
mod session;
mod stream;
mod telemetry;
mod terminal;

pub use app::{fake_bridge_controller, run, run_with_clients_and_log_level, run_with_log_level};
pub use cli::{
    Args, BrightnessArgs, Command, CtArgs, FakeArgs, LogLevel, OutputFormat, RgbArgs,
    SessionOptions, SetAction, SetArgs, TargetArgs, XyArgs,
};
pub use colour::{Colour, ColourError};
pub use error::{ConfigError, ConnectionError, FixtureError, SessionError, StateError};
pub use mixer::{EffectMixer, MixerSnapshot};
pub use session::{
    BridgeDescriptor, BridgeInfo, ColourTarget, ConnectResult, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_GROUP_ID, DEFAULT_UPDATE_FREQUENCY_HZ, Group, SelectOutcome, SessionConfig,
    SessionState, SessionStatus, StartOutcome, StreamSession, StreamingMode,
};
pub use stream::{
    BridgeController, FakeBridgeConfig, FakeBridgeController, FrameSink, GroupSelection,
    GroupTable, RecordingFrameSink, RenderClock,
};
pub use terminal::TerminalClient;
