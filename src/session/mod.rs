mod controller;
mod model;

pub use self::controller::{DEFAULT_CONNECT_TIMEOUT, StreamSession};
pub use self::model::{
    BridgeDescriptor, BridgeInfo, ColourTarget, ConnectResult, DEFAULT_GROUP_ID,
    DEFAULT_UPDATE_FREQUENCY_HZ, Group, SelectOutcome, SessionConfig, SessionState, SessionStatus,
    StartOutcome, StreamingMode,
};
