use std::str::FromStr;

use derive_more::Display;
use serde::Serialize;
use serde_with::SerializeDisplay;

use crate::error::FixtureError;

/// Entertainment group selected when the caller does not name one.
pub const DEFAULT_GROUP_ID: &str = "200";

/// Fixed render cadence of the streaming output, in Hz.
pub const DEFAULT_UPDATE_FREQUENCY_HZ: u32 = 60;

/// Wire protection mode used for the streaming output.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, SerializeDisplay)]
pub enum StreamingMode {
    /// Secure datagram streaming; the only mode this session supports.
    #[display("dtls")]
    Dtls,
}

/// Lifecycle states of a streaming session.
///
/// Transitions run forward along `Uninitialized → Initialized → Connected →
/// GroupSelected → Streaming`; `Stopped` parks the effect gate while keeping
/// the connection and group, and `ShutDown` is terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, SerializeDisplay)]
pub enum SessionState {
    #[display("uninitialized")]
    Uninitialized,
    #[display("initialized")]
    Initialized,
    #[display("connected")]
    Connected,
    #[display("group_selected")]
    GroupSelected,
    #[display("streaming")]
    Streaming,
    #[display("stopped")]
    Stopped,
    #[display("shut_down")]
    ShutDown,
}

/// Outcome reported by the bridge at the end of the connect handshake.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum ConnectResult {
    /// The bridge answered but refused the streaming session in-band.
    #[display("failed")]
    Failed,
    /// Connected; streaming can be started.
    #[display("ready_to_start")]
    ReadyToStart,
    /// Connected and the transport is already streaming.
    #[display("streaming")]
    Streaming,
}

impl ConnectResult {
    /// Returns whether this result represents a usable connection.
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::ReadyToStart | Self::Streaming)
    }
}

/// Outcome of selecting an entertainment group.
///
/// Transports with an auto-start policy begin streaming as a side effect of
/// group selection; the outcome makes that transition explicit instead of
/// hiding it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum SelectOutcome {
    /// The group is ready; streaming has not started yet.
    #[display("group_selected")]
    GroupSelected,
    /// The transport auto-started streaming during selection.
    #[display("streaming")]
    Streaming,
}

/// Outcome of a `start` call.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum StartOutcome {
    /// The effect gate is armed and the bridge is streaming.
    #[display("streaming")]
    Streaming,
    /// The bridge does not report active streaming yet; retry later. This is
    /// a recoverable signal, not a failure.
    #[display("not_ready")]
    NotReady,
}

impl StartOutcome {
    /// Returns whether streaming is active after the call.
    #[must_use]
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Streaming)
    }
}

/// Addressing for a colour update.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ColourTarget {
    /// Every fixture in the selected group.
    Group,
    /// One fixture, addressed by its identifier.
    Fixture(String),
}

/// Identity and credentials of a bridge, as supplied by the caller.
///
/// Credentials become immutable for the lifetime of the session once a
/// connect attempt with them succeeds.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BridgeDescriptor {
    bridge_id: String,
    address: String,
    username: String,
    client_key: String,
}

impl BridgeDescriptor {
    /// Creates a bridge descriptor.
    #[must_use]
    pub fn new(
        bridge_id: impl Into<String>,
        address: impl Into<String>,
        username: impl Into<String>,
        client_key: impl Into<String>,
    ) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            address: address.into(),
            username: username.into(),
            client_key: client_key.into(),
        }
    }

    /// Returns the bridge identifier.
    #[must_use]
    pub fn bridge_id(&self) -> &str {
        &self.bridge_id
    }

    /// Returns the bridge network address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the user token presented during the handshake.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the streaming client key presented during the handshake.
    #[must_use]
    pub fn client_key(&self) -> &str {
        &self.client_key
    }
}

impl FromStr for BridgeDescriptor {
    type Err = FixtureError;

    /// Parses the compact record form `bridge_id|address|username|client_key`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = value.split('|').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(FixtureError::InvalidRecordFieldCount);
        }
        if fields.iter().any(|field| field.is_empty()) {
            return Err(FixtureError::EmptyRecordField);
        }

        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

/// Status of the currently active bridge, as reported by the transport.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BridgeInfo {
    id: String,
    ip: String,
    connected: bool,
    streaming: bool,
}

impl BridgeInfo {
    /// Creates a bridge status record.
    #[must_use]
    pub fn new(id: impl Into<String>, ip: impl Into<String>, connected: bool, streaming: bool) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            connected,
            streaming,
        }
    }

    /// Returns the bridge identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the bridge network address.
    #[must_use]
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Returns whether the transport holds a connection to this bridge.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Returns whether this bridge is actively streaming.
    #[must_use]
    pub fn streaming(&self) -> bool {
        self.streaming
    }
}

/// Read-only snapshot of an entertainment group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Group {
    group_id: String,
    fixture_ids: Vec<String>,
}

impl Group {
    /// Creates a group snapshot with its ordered fixture identifiers.
    #[must_use]
    pub fn new(group_id: impl Into<String>, fixture_ids: Vec<String>) -> Self {
        Self {
            group_id: group_id.into(),
            fixture_ids,
        }
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns the ordered fixture identifiers in this group.
    #[must_use]
    pub fn fixture_ids(&self) -> &[String] {
        &self.fixture_ids
    }
}

/// Immutable session configuration built at initialisation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    app_name: String,
    device_name: String,
    streaming_mode: StreamingMode,
    update_frequency_hz: u32,
}

impl SessionConfig {
    pub(crate) fn new(app_name: String, device_name: String) -> Self {
        Self {
            app_name,
            device_name,
            streaming_mode: StreamingMode::Dtls,
            update_frequency_hz: DEFAULT_UPDATE_FREQUENCY_HZ,
        }
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

    /// Returns the streaming protection mode.
    #[must_use]
    pub fn streaming_mode(&self) -> StreamingMode {
        self.streaming_mode
    }

    /// Returns the fixed render cadence in Hz.
    #[must_use]
    pub fn update_frequency_hz(&self) -> u32 {
        self.update_frequency_hz
    }
}

/// Full status record of a session, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    initialized: bool,
    connected: bool,
    streaming: bool,
    state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    streaming_mode: Option<StreamingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bridge: Option<BridgeInfo>,
}

impl SessionStatus {
    pub(crate) fn new(
        initialized: bool,
        connected: bool,
        streaming: bool,
        state: SessionState,
        app_name: Option<String>,
        device_name: Option<String>,
        streaming_mode: Option<StreamingMode>,
        selected_group: Option<String>,
        bridge: Option<BridgeInfo>,
    ) -> Self {
        Self {
            initialized,
            connected,
            streaming,
            state,
            app_name,
            device_name,
            streaming_mode,
            selected_group,
            bridge,
        }
    }

    /// Returns whether the session has been initialised.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Returns whether a bridge connection is active.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Returns whether the bridge reports active streaming. This is a live
    /// poll of the transport, not a cached flag.
    #[must_use]
    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// Returns the lifecycle state at the time of the query.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the selected entertainment group, if any.
    #[must_use]
    pub fn selected_group(&self) -> Option<&str> {
        self.selected_group.as_deref()
    }

    /// Returns the active bridge record, if any.
    #[must_use]
    pub fn bridge(&self) -> Option<&BridgeInfo> {
        self.bridge.as_ref()
    }
}
