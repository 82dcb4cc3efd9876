use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::info;

use crate::error::{ConnectionError, FixtureError};
use crate::mixer::{EffectMixer, MixerSnapshot};
use crate::session::{
    BridgeDescriptor, BridgeInfo, ConnectResult, DEFAULT_UPDATE_FREQUENCY_HZ, Group,
};
use crate::stream::render::RenderClock;
use crate::stream::transport::{BridgeController, FrameSink, GroupSelection};

/// Parsed fake entertainment-group table.
///
/// Record form: `group_id:fixture,fixture,...` with records separated by
/// `;`, e.g. `200:1,2,3;201:7,8`.
#[derive(Debug, Clone)]
pub struct GroupTable {
    groups: Vec<Group>,
}

impl GroupTable {
    fn lookup(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.group_id() == group_id)
    }
}

impl FromStr for GroupTable {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(FixtureError::EmptyFixture);
        }

        let mut groups: Vec<Group> = Vec::new();
        for record in value.split(';') {
            let (group_id, fixtures) = record
                .split_once(':')
                .ok_or(FixtureError::InvalidGroupRecord)?;
            let group_id = group_id.trim();
            if group_id.is_empty() {
                return Err(FixtureError::InvalidGroupRecord);
            }
            if groups.iter().any(|group| group.group_id() == group_id) {
                return Err(FixtureError::DuplicateGroup {
                    group_id: group_id.to_string(),
                });
            }

            let fixture_ids: Vec<String> = fixtures
                .split(',')
                .map(str::trim)
                .filter(|fixture| !fixture.is_empty())
                .map(ToString::to_string)
                .collect();
            if fixture_ids.is_empty() {
                return Err(FixtureError::EmptyGroup {
                    group_id: group_id.to_string(),
                });
            }

            groups.push(Group::new(group_id, fixture_ids));
        }

        Ok(Self { groups })
    }
}

/// Settings for constructing a fake bridge transport.
#[derive(Debug, Builder)]
pub struct FakeBridgeConfig {
    /// Credentials the simulated bridge accepts.
    bridge: BridgeDescriptor,
    /// Entertainment groups the simulated bridge knows about.
    groups: GroupTable,
    /// Artificial handshake latency.
    #[builder(default)]
    connect_delay: Duration,
    /// Whether group selection auto-starts the streaming output.
    #[builder(default = true)]
    auto_start: bool,
    /// Render cadence of the simulated streaming output.
    #[builder(default = DEFAULT_UPDATE_FREQUENCY_HZ)]
    update_frequency_hz: u32,
}

#[derive(Debug, Default)]
struct FakeBridgeState {
    connected: bool,
    streaming: bool,
    clock: Option<RenderClock>,
}

/// In-process [`BridgeController`] used in tests and non-hardware
/// environments.
///
/// The handshake validates the caller's descriptor against the fixture
/// credentials, group selection resolves against the fixture group table,
/// and the streaming output is a [`RenderClock`] feeding a
/// [`RecordingFrameSink`] instead of a socket.
pub struct FakeBridgeController {
    accepted: BridgeDescriptor,
    groups: GroupTable,
    connect_delay: Duration,
    auto_start: bool,
    update_frequency_hz: u32,
    sink: Arc<RecordingFrameSink>,
    state: Mutex<FakeBridgeState>,
}

impl FakeBridgeController {
    /// Creates a fake bridge from explicit settings.
    #[must_use]
    pub fn new(config: FakeBridgeConfig) -> Self {
        Self {
            accepted: config.bridge,
            groups: config.groups,
            connect_delay: config.connect_delay,
            auto_start: config.auto_start,
            update_frequency_hz: config.update_frequency_hz,
            sink: Arc::new(RecordingFrameSink::default()),
            state: Mutex::new(FakeBridgeState::default()),
        }
    }

    /// Returns the sink recording every frame the simulated output emitted.
    #[must_use]
    pub fn frame_sink(&self) -> Arc<RecordingFrameSink> {
        Arc::clone(&self.sink)
    }

    fn take_clock(&self) -> Option<RenderClock> {
        let mut state = self.state.lock();
        state.streaming = false;
        state.clock.take()
    }
}

#[async_trait]
impl BridgeController for FakeBridgeController {
    async fn connect(
        &self,
        descriptor: &BridgeDescriptor,
        timeout: Duration,
    ) -> Result<ConnectResult, ConnectionError> {
        if self.connect_delay > timeout {
            sleep(timeout).await;
            return Err(ConnectionError::HandshakeTimeout {
                address: descriptor.address().to_string(),
                timeout,
            });
        }
        if !self.connect_delay.is_zero() {
            sleep(self.connect_delay).await;
        }

        if descriptor.address() != self.accepted.address() {
            return Err(ConnectionError::Unreachable {
                address: descriptor.address().to_string(),
            });
        }
        if descriptor.bridge_id() != self.accepted.bridge_id()
            || descriptor.username() != self.accepted.username()
            || descriptor.client_key() != self.accepted.client_key()
        {
            return Err(ConnectionError::InvalidCredentials {
                bridge_id: descriptor.bridge_id().to_string(),
            });
        }

        let mut state = self.state.lock();
        state.connected = true;
        info!(bridge_id = descriptor.bridge_id(), "fake bridge accepted handshake");
        Ok(if state.streaming {
            ConnectResult::Streaming
        } else {
            ConnectResult::ReadyToStart
        })
    }

    async fn select_group(
        &self,
        group_id: &str,
        mixer: Arc<EffectMixer>,
    ) -> Result<GroupSelection, ConnectionError> {
        let group = self
            .groups
            .lookup(group_id)
            .cloned()
            .ok_or_else(|| ConnectionError::GroupRejected {
                group_id: group_id.to_string(),
            })?;

        let mut state = self.state.lock();
        if self.auto_start && state.clock.is_none() {
            let sink: Arc<dyn FrameSink> = self.sink.clone();
            state.clock = Some(RenderClock::spawn(mixer, sink, self.update_frequency_hz));
            state.streaming = true;
            info!(group_id, "fake bridge auto-started streaming");
        }

        Ok(GroupSelection::new(group, state.streaming))
    }

    fn is_streaming(&self) -> bool {
        self.state.lock().streaming
    }

    fn active_bridge(&self) -> Option<BridgeInfo> {
        let state = self.state.lock();
        if !state.connected {
            return None;
        }
        Some(BridgeInfo::new(
            self.accepted.bridge_id(),
            self.accepted.address(),
            state.connected,
            state.streaming,
        ))
    }

    async fn stop(&self) -> bool {
        if let Some(clock) = self.take_clock() {
            clock.shutdown().await;
        }
        true
    }

    async fn shutdown(&self) -> bool {
        let clock = {
            let mut state = self.state.lock();
            state.connected = false;
            state.streaming = false;
            state.clock.take()
        };
        if let Some(clock) = clock {
            clock.shutdown().await;
        }
        true
    }
}

/// Records every frame the simulated streaming output emitted.
#[derive(Debug, Default)]
pub struct RecordingFrameSink {
    frames: Mutex<Vec<MixerSnapshot>>,
}

impl RecordingFrameSink {
    /// Returns how many frames have been emitted so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns the most recently emitted frame, if any.
    #[must_use]
    pub fn last_frame(&self) -> Option<MixerSnapshot> {
        self.frames.lock().last().cloned()
    }

    /// Returns a copy of every emitted frame.
    #[must_use]
    pub fn frames(&self) -> Vec<MixerSnapshot> {
        self.frames.lock().clone()
    }
}

impl FrameSink for RecordingFrameSink {
    fn emit(&self, snapshot: &MixerSnapshot) {
        self.frames.lock().push(snapshot.clone());
    }
}
