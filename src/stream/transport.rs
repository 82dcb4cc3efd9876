use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ConnectionError;
use crate::mixer::{EffectMixer, MixerSnapshot};
use crate::session::{BridgeDescriptor, BridgeInfo, ConnectResult, Group};

/// Streaming transport collaborator.
///
/// Implementations own the physical packet encoding, socket handling and
/// credential handshake; the session only sees this contract. The transport's
/// render path samples the mixer handed over in
/// [`BridgeController::select_group`] through the mixer's own snapshot API,
/// so no lock primitive ever crosses this boundary.
///
/// `connect` and `select_group` are the only operations in the system that
/// may block on the network; neither is ever invoked while a mixer guard is
/// held.
#[async_trait]
pub trait BridgeController: Send + Sync {
    /// Performs the credential handshake with the bridge, bounded by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the bridge is unreachable, rejects the
    /// credentials, or does not answer within the timeout.
    async fn connect(
        &self,
        descriptor: &BridgeDescriptor,
        timeout: Duration,
    ) -> Result<ConnectResult, ConnectionError>;

    /// Selects an entertainment group and hands the mixer to the transport's
    /// render path. Blocks until the bridge confirms the group; transports
    /// with an auto-start policy begin streaming before returning.
    ///
    /// # Errors
    ///
    /// Returns an error when the bridge rejects the group.
    async fn select_group(
        &self,
        group_id: &str,
        mixer: Arc<EffectMixer>,
    ) -> Result<GroupSelection, ConnectionError>;

    /// Live streaming status as reported by the bridge. This poll is the
    /// single source of truth for gating decisions; cached session flags are
    /// never authoritative.
    fn is_streaming(&self) -> bool;

    /// Returns the currently connected bridge, if any.
    fn active_bridge(&self) -> Option<BridgeInfo>;

    /// Stops the streaming output. Best-effort; reports success as a bool.
    async fn stop(&self) -> bool;

    /// Tears down the transport. Best-effort and idempotent.
    async fn shutdown(&self) -> bool;
}

/// Result of a confirmed group selection.
#[derive(Debug, Clone)]
pub struct GroupSelection {
    group: Group,
    streaming: bool,
}

impl GroupSelection {
    /// Creates a selection result.
    #[must_use]
    pub fn new(group: Group, streaming: bool) -> Self {
        Self { group, streaming }
    }

    /// Returns the confirmed group snapshot.
    #[must_use]
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Returns whether the transport auto-started streaming during
    /// selection.
    #[must_use]
    pub fn streaming(&self) -> bool {
        self.streaming
    }

    pub(crate) fn into_group(self) -> Group {
        self.group
    }
}

/// Consumer of sampled mixer snapshots on the render path.
///
/// `emit` runs once per render tick after the mixer guard has been released;
/// implementations must not block.
pub trait FrameSink: Send + Sync {
    /// Consumes one sampled frame.
    fn emit(&self, snapshot: &MixerSnapshot);
}
