mod fake;
mod render;
mod transport;

pub use self::fake::{FakeBridgeConfig, FakeBridgeController, GroupTable, RecordingFrameSink};
pub use self::render::RenderClock;
pub use self::transport::{BridgeController, FrameSink, GroupSelection};
