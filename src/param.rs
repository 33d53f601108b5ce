//! Sample-accurate parameter automation.
//!
//! A [`Param`] holds a value that changes over time according to a list of
//! scheduled events. Events are kept in time order; computing the value at a
//! time `t` walks the events that have started by `t`.

/// A scheduled change to a [`Param`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamEvent {
    /// Jump to `value` at time `at`
    SetValueAtTime { value: f32, at: f64 },
    /// Ramp exponentially from the previous event's value to `value`, arriving at `end`
    ExponentialRampToValueAtTime { value: f32, end: f64 },
}

impl ParamEvent {
    /// Time at which this event has fully taken effect
    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValueAtTime { at, .. } => at,
            ParamEvent::ExponentialRampToValueAtTime { end, .. } => end,
        }
    }

    #[inline]
    fn value(&self) -> f32 {
        match *self {
            ParamEvent::SetValueAtTime { value, .. } => value,
            ParamEvent::ExponentialRampToValueAtTime { value, .. } => value,
        }
    }
}

/// An automatable value.
#[derive(Clone, Debug)]
pub struct Param {
    /// Value and time of the last event that has fully elapsed
    base: (f32, f64),
    events: Vec<ParamEvent>,
}

impl Param {
    pub fn new(value: f32) -> Self {
        Self {
            base: (value, 0.0),
            events: Vec::new(),
        }
    }

    /// Schedule an event, keeping events ordered by time.
    ///
    /// Events scheduled for the same time keep their insertion order.
    pub fn schedule(&mut self, event: ParamEvent) {
        let at = event.time();
        let pos = self.events.partition_point(|e| e.time() <= at);
        self.events.insert(pos, event);
    }

    pub fn set_value_at_time(&mut self, value: f32, at: f64) {
        self.schedule(ParamEvent::SetValueAtTime { value, at });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, end: f64) {
        self.schedule(ParamEvent::ExponentialRampToValueAtTime { value, end });
    }

    /// Drop all pending events and hold `value` from now on.
    pub fn set_value(&mut self, value: f32, now: f64) {
        self.events.clear();
        self.base = (value, now);
    }

    /// Number of events not yet folded into the base value
    #[inline]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Value of the parameter at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let (mut value, mut time) = self.base;

        for event in &self.events {
            match *event {
                ParamEvent::SetValueAtTime { value: v, at } => {
                    if t < at {
                        return value;
                    }
                    value = v;
                    time = at;
                }
                ParamEvent::ExponentialRampToValueAtTime { value: v1, end } => {
                    if t < end {
                        return exponential(value, time, v1, end, t);
                    }
                    value = v1;
                    time = end;
                }
            }
        }

        value
    }

    /// Fold every event that completed before `t` into the base value.
    ///
    /// Call with the start time of a block; later lookups must not ask for
    /// times earlier than `t`.
    pub fn advance(&mut self, t: f64) {
        let elapsed = self.events.partition_point(|e| e.time() <= t);
        if elapsed == 0 {
            return;
        }
        let last = self.events[elapsed - 1];
        self.base = (last.value(), last.time());
        self.events.drain(..elapsed);
    }
}

/// `v0 * (v1 / v0)^((t - t0) / (t1 - t0))`, holding `v0` when the ramp is undefined.
fn exponential(v0: f32, t0: f64, v1: f32, t1: f64, t: f64) -> f32 {
    if v0 == 0.0 || v1 == 0.0 || (v0 < 0.0) != (v1 < 0.0) {
        return v0;
    }
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let progress = ((t - t0) / span).clamp(0.0, 1.0);
    (v0 as f64 * (v1 as f64 / v0 as f64).powf(progress)) as f32
}
