use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::mixer::EffectMixer;
use crate::stream::transport::FrameSink;

/// Fixed-period driver of the streaming output.
///
/// Once spawned, the clock samples the mixer at the configured cadence and
/// forwards enabled snapshots to the sink. A tick that cannot acquire the
/// mixer is skipped rather than delayed, so a slow writer costs at most one
/// tick of output; a disabled gate simply produces no frame. Sampling
/// failures never surface anywhere else: the next tick retries.
#[derive(Debug)]
pub struct RenderClock {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RenderClock {
    /// Spawns the sampling task at `frequency_hz` ticks per second.
    #[must_use]
    pub fn spawn(mixer: Arc<EffectMixer>, sink: Arc<dyn FrameSink>, frequency_hz: u32) -> Self {
        let cancel = CancellationToken::new();
        let period = Duration::from_secs_f64(1.0 / f64::from(frequency_hz.max(1)));
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = ticker.tick() => match mixer.try_snapshot() {
                        Some(snapshot) if snapshot.enabled() => sink.emit(&snapshot),
                        Some(_) => {}
                        None => trace!("mixer contended, skipping render tick"),
                    },
                }
            }
        });

        Self { cancel, handle }
    }

    /// Cancels the sampling task and waits for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(error) = self.handle.await {
            trace!(?error, "render clock task did not shut down cleanly");
        }
    }
}
