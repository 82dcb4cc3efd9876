use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{instrument, warn};

use crate::colour::Colour;
use crate::error::{ConfigError, SessionError, StateError};
use crate::mixer::EffectMixer;
use crate::session::model::{
    BridgeDescriptor, ColourTarget, ConnectResult, DEFAULT_GROUP_ID, Group, SelectOutcome,
    SessionConfig, SessionState, SessionStatus, StartOutcome,
};
use crate::stream::BridgeController;

/// Default bound on the connect handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct Shared {
    state: State,
    config: Option<SessionConfig>,
    bridge: Option<BridgeDescriptor>,
    group: Option<Group>,
    /// Set once `start` has armed the effect; colour writes are refused
    /// before that even when the transport auto-started streaming.
    effect_armed: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
enum State {
    #[default]
    Uninitialized,
    Initialized,
    Connected,
    GroupSelected,
    Streaming,
    Stopped,
    ShutDown,
}

impl State {
    fn is_connected(self) -> bool {
        matches!(
            self,
            Self::Connected | Self::GroupSelected | Self::Streaming | Self::Stopped
        )
    }

    /// Colour writes are legal once `start` has armed the effect, including
    /// after a `stop` (a write re-enables the gate).
    fn accepts_colour_writes(self) -> bool {
        matches!(self, Self::Streaming | Self::Stopped)
    }

    fn as_session_state(self) -> SessionState {
        match self {
            Self::Uninitialized => SessionState::Uninitialized,
            Self::Initialized => SessionState::Initialized,
            Self::Connected => SessionState::Connected,
            Self::GroupSelected => SessionState::GroupSelected,
            Self::Streaming => SessionState::Streaming,
            Self::Stopped => SessionState::Stopped,
            Self::ShutDown => SessionState::ShutDown,
        }
    }
}

/// One streaming session: lifecycle state machine, owned bridge and group
/// records, and the colour mixer sampled by the transport's render path.
///
/// Lifecycle operations (`connect`, `select_group`, `start`, `shutdown`)
/// serialise on an internal async mutex so the blocking handshake runs at
/// most once at a time; colour calls never touch that mutex and gate on the
/// transport's live streaming status instead, so a slow handshake cannot
/// stall them. The mixer has its own exclusion and is never held across the
/// transport calls.
pub struct StreamSession {
    controller: Box<dyn BridgeController>,
    lifecycle: tokio::sync::Mutex<()>,
    shared: RwLock<Shared>,
    mixer: Arc<EffectMixer>,
}

impl StreamSession {
    /// Creates a session driving the given transport.
    #[must_use]
    pub fn new(controller: Box<dyn BridgeController>) -> Self {
        Self {
            controller,
            lifecycle: tokio::sync::Mutex::new(()),
            shared: RwLock::new(Shared::default()),
            mixer: Arc::new(EffectMixer::new()),
        }
    }

    /// Builds the session configuration. Legal from the uninitialised state;
    /// calling it again on an initialised session is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an identifier is empty and
    /// [`StateError::ShutDown`] on a terminated session.
    #[instrument(skip(self), level = "info")]
    pub fn initialize(&self, app_name: &str, device_name: &str) -> Result<(), SessionError> {
        if app_name.trim().is_empty() {
            return Err(ConfigError::EmptyAppName.into());
        }
        if device_name.trim().is_empty() {
            return Err(ConfigError::EmptyDeviceName.into());
        }

        let mut shared = self.shared.write();
        match shared.state {
            State::ShutDown => Err(StateError::ShutDown.into()),
            State::Uninitialized => {
                shared.config = Some(SessionConfig::new(
                    app_name.to_string(),
                    device_name.to_string(),
                ));
                shared.state = State::Initialized;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Connects to the bridge with the default handshake timeout.
    ///
    /// # Errors
    ///
    /// See [`StreamSession::connect_with_timeout`].
    pub async fn connect(
        &self,
        descriptor: BridgeDescriptor,
    ) -> Result<ConnectResult, SessionError> {
        self.connect_with_timeout(descriptor, DEFAULT_CONNECT_TIMEOUT)
            .await
    }

    /// Performs the credential handshake, bounded by `timeout`. On success
    /// the descriptor's credentials become immutable for the lifetime of the
    /// session.
    ///
    /// This and [`StreamSession::select_group`] are the only blocking
    /// operations in the system; the mixer's exclusion is never held while
    /// they wait.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when called before `initialize`, after
    /// `shutdown`, or on an already connected session, and
    /// [`crate::ConnectionError`] when the bridge is unreachable, rejects
    /// the credentials, or times out.
    #[instrument(
        skip(self, descriptor),
        level = "info",
        fields(bridge_id = descriptor.bridge_id(), address = descriptor.address())
    )]
    pub async fn connect_with_timeout(
        &self,
        descriptor: BridgeDescriptor,
        timeout: Duration,
    ) -> Result<ConnectResult, SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        {
            let shared = self.shared.read();
            match shared.state {
                State::ShutDown => return Err(StateError::ShutDown.into()),
                State::Uninitialized => return Err(StateError::NotInitialized.into()),
                state if state.is_connected() => {
                    let bridge_id = shared
                        .bridge
                        .as_ref()
                        .map(|bridge| bridge.bridge_id().to_string())
                        .unwrap_or_default();
                    return Err(StateError::AlreadyConnected { bridge_id }.into());
                }
                _ => {}
            }
        }

        let result = self.controller.connect(&descriptor, timeout).await?;
        if result.is_connected() {
            let mut shared = self.shared.write();
            shared.bridge = Some(descriptor);
            shared.state = State::Connected;
        }
        Ok(result)
    }

    /// Selects an entertainment group, waiting until the bridge confirms it.
    /// `None` selects the default group. Transports with an auto-start
    /// policy advance the session straight to streaming; the outcome makes
    /// that explicit.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when called out of order and
    /// [`crate::ConnectionError`] when the bridge rejects the group.
    #[instrument(skip(self), level = "info")]
    pub async fn select_group(
        &self,
        group_id: Option<&str>,
    ) -> Result<SelectOutcome, SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        {
            let shared = self.shared.read();
            match shared.state {
                State::ShutDown => return Err(StateError::ShutDown.into()),
                state if !state.is_connected() => return Err(StateError::NotConnected.into()),
                _ => {}
            }
        }

        let group_id = group_id.unwrap_or(DEFAULT_GROUP_ID);
        let selection = self
            .controller
            .select_group(group_id, Arc::clone(&self.mixer))
            .await?;

        let outcome = if selection.streaming() {
            SelectOutcome::Streaming
        } else {
            SelectOutcome::GroupSelected
        };
        let mut shared = self.shared.write();
        shared.group = Some(selection.into_group());
        shared.state = match outcome {
            SelectOutcome::Streaming => State::Streaming,
            SelectOutcome::GroupSelected => State::GroupSelected,
        };
        Ok(outcome)
    }

    /// Arms the effect gate so colour updates reach the streaming output.
    /// Idempotent once streaming.
    ///
    /// When the bridge does not report active streaming yet, the call
    /// reports [`StartOutcome::NotReady`] — a recoverable signal, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when called before a connection and group
    /// selection are in place or after shutdown.
    #[instrument(skip(self), level = "info")]
    pub async fn start(&self) -> Result<StartOutcome, SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        {
            let shared = self.shared.read();
            match shared.state {
                State::ShutDown => return Err(StateError::ShutDown.into()),
                state if !state.is_connected() => return Err(StateError::NotConnected.into()),
                _ => {}
            }
            if shared.group.is_none() {
                return Err(StateError::GroupNotSelected.into());
            }
        }

        if !self.controller.is_streaming() {
            return Ok(StartOutcome::NotReady);
        }

        self.mixer.enable();
        let mut shared = self.shared.write();
        shared.effect_armed = true;
        shared.state = State::Streaming;
        Ok(StartOutcome::Streaming)
    }

    /// Disables the effect gate while leaving the transport's streaming
    /// connection open. Best-effort: never raises.
    #[instrument(skip(self), level = "info")]
    pub fn stop(&self) -> bool {
        self.mixer.disable();
        let mut shared = self.shared.write();
        if shared.state == State::Streaming {
            shared.state = State::Stopped;
        }
        true
    }

    /// Tears the session down: disables the effect, stops the transport's
    /// streaming output if active, releases the bridge, group and
    /// configuration, and marks the session terminal. Idempotent and
    /// best-effort; teardown steps run regardless of earlier step failures.
    #[instrument(skip(self), level = "info")]
    pub async fn shutdown(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().await;

        if self.shared.read().state == State::ShutDown {
            return true;
        }

        self.mixer.disable();
        if self.controller.is_streaming() && !self.controller.stop().await {
            warn!("transport did not confirm streaming stop during shutdown");
        }
        if !self.controller.shutdown().await {
            warn!("transport did not confirm shutdown");
        }
        self.mixer.reset();

        let mut shared = self.shared.write();
        shared.state = State::ShutDown;
        shared.config = None;
        shared.bridge = None;
        shared.group = None;
        shared.effect_armed = false;
        true
    }

    /// Normalises and stores a colour for the addressed fixtures
    /// (last write wins per fixture) and re-enables the effect gate.
    /// Returns the number of fixtures updated; the addressed set is updated
    /// in one critical section or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the session is not streaming (the bridge
    /// poll is authoritative) or no group is selected for a group-wide
    /// update.
    #[instrument(skip(self, colour), level = "debug")]
    pub fn set_colour(
        &self,
        target: &ColourTarget,
        colour: Colour,
    ) -> Result<usize, SessionError> {
        let fixture_ids = self.resolve_target(target)?;
        self.mixer
            .apply(fixture_ids.iter().map(String::as_str), colour);

        // A write re-arms a stopped session (see EffectMixer::apply).
        let mut shared = self.shared.write();
        if shared.state == State::Stopped {
            shared.state = State::Streaming;
        }
        Ok(fixture_ids.len())
    }

    /// Applies a brightness-only update: white scaled by `brightness`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ColourError`] when the brightness is out of range,
    /// otherwise the same errors as [`StreamSession::set_colour`].
    pub fn set_brightness(
        &self,
        target: &ColourTarget,
        brightness: f64,
    ) -> Result<usize, SessionError> {
        let colour = Colour::from_brightness(brightness)?;
        self.set_colour(target, colour)
    }

    /// Returns the ordered fixture identifiers of the selected group.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when no connection or group selection is in
    /// place.
    pub fn light_ids(&self) -> Result<Vec<String>, SessionError> {
        let shared = self.shared.read();
        match shared.state {
            State::ShutDown => return Err(StateError::ShutDown.into()),
            state if !state.is_connected() => return Err(StateError::NotConnected.into()),
            _ => {}
        }
        shared
            .group
            .as_ref()
            .map(|group| group.fixture_ids().to_vec())
            .ok_or_else(|| StateError::GroupNotSelected.into())
    }

    /// Returns the full session status. The streaming flag is a live poll
    /// of the transport, never a cached value.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let shared = self.shared.read();
        let streaming = self.controller.is_streaming();
        SessionStatus::new(
            shared.config.is_some(),
            shared.bridge.is_some() && shared.state.is_connected(),
            streaming,
            shared.state.as_session_state(),
            shared
                .config
                .as_ref()
                .map(|config| config.app_name().to_string()),
            shared
                .config
                .as_ref()
                .map(|config| config.device_name().to_string()),
            shared.config.as_ref().map(SessionConfig::streaming_mode),
            shared
                .group
                .as_ref()
                .map(|group| group.group_id().to_string()),
            self.controller.active_bridge(),
        )
    }

    /// Returns the lifecycle state at the time of the call.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.read().state.as_session_state()
    }

    /// Returns the mixer owned by this session.
    #[must_use]
    pub fn mixer(&self) -> &EffectMixer {
        &self.mixer
    }

    fn resolve_target(&self, target: &ColourTarget) -> Result<Vec<String>, SessionError> {
        let shared = self.shared.read();
        if shared.state == State::ShutDown {
            return Err(StateError::ShutDown.into());
        }
        if !shared.effect_armed
            || !shared.state.accepts_colour_writes()
            || !self.controller.is_streaming()
        {
            return Err(StateError::NotStreaming.into());
        }

        match target {
            ColourTarget::Group => shared
                .group
                .as_ref()
                .map(|group| group.fixture_ids().to_vec())
                .ok_or_else(|| StateError::GroupNotSelected.into()),
            ColourTarget::Fixture(fixture_id) => Ok(vec![fixture_id.clone()]),
        }
    }
}
