use std::collections::HashMap;

use parking_lot::Mutex;

use crate::colour::Colour;

/// Thread-safe fixture→colour registry sampled by the render path.
///
/// The mixer is the only state shared between client colour calls and the
/// render clock. Every operation takes the internal lock exactly once and
/// performs no I/O while holding it, so writers and the sampler serialise
/// on short critical sections. Writing a colour re-enables the mixer gate;
/// `disable` (driven by session stop/shutdown) parks the stored colours
/// without discarding them.
#[derive(Debug, Default)]
pub struct EffectMixer {
    inner: Mutex<MixerState>,
}

#[derive(Debug, Default)]
struct MixerState {
    colours: HashMap<String, Colour>,
    enabled: bool,
}

impl EffectMixer {
    /// Creates an empty, disabled mixer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the colour of every addressed fixture (last write wins)
    /// and re-enables the mixer gate.
    pub fn apply<'a, I>(&self, fixtures: I, colour: Colour)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = self.inner.lock();
        for fixture_id in fixtures {
            state.colours.insert(fixture_id.to_string(), colour);
        }
        state.enabled = true;
    }

    /// Marks the stored colours as eligible for sampling. Idempotent.
    pub fn enable(&self) {
        self.inner.lock().enabled = true;
    }

    /// Parks the stored colours so the render path stops emitting them.
    /// Idempotent.
    pub fn disable(&self) {
        self.inner.lock().enabled = false;
    }

    /// Returns whether the stored colours are eligible for sampling.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Clears all stored colours and disables the gate.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.colours.clear();
        state.enabled = false;
    }

    /// Takes an internally consistent copy of the full fixture→colour map.
    #[must_use]
    pub fn snapshot(&self) -> MixerSnapshot {
        let state = self.inner.lock();
        MixerSnapshot {
            colours: state.colours.clone(),
            enabled: state.enabled,
        }
    }

    /// Like [`EffectMixer::snapshot`], but refuses to block: returns `None`
    /// when the mixer is currently held by a writer. The render clock uses
    /// this so a slow caller costs at most a skipped tick.
    #[must_use]
    pub fn try_snapshot(&self) -> Option<MixerSnapshot> {
        let state = self.inner.try_lock()?;
        Some(MixerSnapshot {
            colours: state.colours.clone(),
            enabled: state.enabled,
        })
    }
}

/// An immutable copy of the mixer's state at one serialisation point.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerSnapshot {
    colours: HashMap<String, Colour>,
    enabled: bool,
}

impl MixerSnapshot {
    /// Returns whether the mixer gate was enabled when this copy was taken.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the colour stored for one fixture, if any.
    #[must_use]
    pub fn colour_of(&self, fixture_id: &str) -> Option<Colour> {
        self.colours.get(fixture_id).copied()
    }

    /// Returns the number of fixtures with a stored colour.
    #[must_use]
    pub fn fixture_count(&self) -> usize {
        self.colours.len()
    }

    /// Returns the full fixture→colour map.
    #[must_use]
    pub fn colours(&self) -> &HashMap<String, Colour> {
        &self.colours
    }
}
