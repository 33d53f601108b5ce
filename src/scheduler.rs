//! Playback scheduling: start a voice now, stop it later.
//!
//! Deferred stops live in a [`TimerQueue`] keyed on the backend clock rather
//! than on wall-clock timers, so a caller drives them by polling and tests can
//! move time forward by hand.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::backend::AudioBackend;
use crate::synth::Voice;

/// Identifies a scheduled stop
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimerId(u64);

/// Deferred actions ordered by due time.
#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: BTreeMap<(Duration, TimerId), T>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `item` to come due at `due`
    pub fn schedule(&mut self, due: Duration, item: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((due, id), item);
        id
    }

    /// Remove a pending timer, returning its item if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.pending.keys().find(|(_, timer)| *timer == id).copied()?;
        self.pending.remove(&key)
    }

    /// Remove and return every item due at or before `now`, earliest first
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// When the next timer comes due
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Starts voices and stops them after a delay.
#[derive(Debug)]
pub struct PlaybackScheduler<N> {
    timers: TimerQueue<Voice<N>>,
}

impl<N> Default for PlaybackScheduler<N> {
    fn default() -> Self {
        Self { timers: TimerQueue::new() }
    }
}

impl<N: Copy + std::fmt::Debug> PlaybackScheduler<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the voice's source at the backend's current time.
    pub fn start<B: AudioBackend<Node = N>>(&mut self, backend: &mut B, voice: &Voice<N>) {
        let now = backend.current_time();
        backend.start(voice.source, now);
        debug!(source = ?voice.source, at = now, "voice started");
    }

    /// Stop the voice `after` the backend's current time.
    pub fn schedule_stop<B: AudioBackend<Node = N>>(&mut self, backend: &B, voice: Voice<N>, after: Duration) -> TimerId {
        // `Duration::MAX` means never
        let due = clock(backend).saturating_add(after);
        let id = self.timers.schedule(due, voice);
        debug!(?id, ?due, "stop scheduled");
        id
    }

    /// Drop a scheduled stop. The voice keeps playing until released some other way.
    pub fn cancel(&mut self, id: TimerId) -> Option<Voice<N>> {
        self.timers.cancel(id)
    }

    /// Stop and release every voice whose stop is due. Returns how many were stopped.
    pub fn fire_due<B: AudioBackend<Node = N>>(&mut self, backend: &mut B) -> usize {
        let now = backend.current_time();
        let due = self.timers.drain_due(clock(backend));
        for voice in &due {
            backend.stop(voice.source, now);
            backend.release(voice.source);
            if let Some(gain) = voice.gain {
                backend.release(gain);
            }
            debug!(source = ?voice.source, at = now, "voice stopped");
        }
        due.len()
    }

    /// Voices still waiting for their stop
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }
}

fn clock<B: AudioBackend>(backend: &B) -> Duration {
    Duration::from_secs_f64(backend.current_time().max(0.0))
}
