use std::time::Duration;

use derive_more::From;
use thiserror::Error;

use crate::colour::ColourError;

/// Errors returned when validating session initialisation arguments.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("application name cannot be empty")]
    EmptyAppName,
    #[error("device name cannot be empty")]
    EmptyDeviceName,
}

/// Errors returned by bridge handshake and group negotiation.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConnectionError {
    #[error("bridge at `{address}` did not complete the handshake within {timeout:?}")]
    HandshakeTimeout { address: String, timeout: Duration },
    #[error("no bridge is reachable at `{address}`")]
    Unreachable { address: String },
    #[error("bridge `{bridge_id}` rejected the streaming credentials")]
    InvalidCredentials { bridge_id: String },
    #[error("bridge rejected entertainment group `{group_id}`")]
    GroupRejected { group_id: String },
}

/// Errors returned when an operation is illegal for the current lifecycle state.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StateError {
    #[error("the session has not been initialised")]
    NotInitialized,
    #[error("the session is already connected to bridge `{bridge_id}`")]
    AlreadyConnected { bridge_id: String },
    #[error("no bridge connection is active")]
    NotConnected,
    #[error("no entertainment group has been selected")]
    GroupNotSelected,
    #[error("the bridge is not streaming; colour updates are not accepted")]
    NotStreaming,
    #[error("the session has been shut down")]
    ShutDown,
}

/// Errors returned when parsing fake bridge fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("the fake bridge fixture is empty")]
    EmptyFixture,
    #[error("bridge records must contain four pipe-delimited fields")]
    InvalidRecordFieldCount,
    #[error("bridge records cannot contain empty fields")]
    EmptyRecordField,
    #[error("group records must look like `id:fixture,fixture,...`")]
    InvalidGroupRecord,
    #[error("group `{group_id}` appears more than once in the fixture")]
    DuplicateGroup { group_id: String },
    #[error("group `{group_id}` has no fixtures")]
    EmptyGroup { group_id: String },
}

/// Errors returned when validating runtime backend options.
#[derive(Debug, Error)]
pub(crate) enum CliConfigError {
    #[error("missing fake bridge fixture while fake mode is enabled")]
    MissingFakeBridgeFixture,
    #[error("missing fake group fixture while fake mode is enabled")]
    MissingFakeGroupFixture,
    #[error("no streaming transport is available; run with --fake and fixture flags")]
    MissingTransportBackend,
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level session errors wrapping the per-concern error types.
#[derive(Debug, Error, From)]
pub enum SessionError {
    #[error(transparent)]
    Config(ConfigError),
    #[error(transparent)]
    Connection(ConnectionError),
    #[error(transparent)]
    State(StateError),
    #[error(transparent)]
    Colour(ColourError),
}
