//! Virtual-clock timer queue.
//!
//! The browser only gives us one cooperative thread. Instead of scattering
//! `setTimeout`/`setInterval` handles across the DOM, every component keeps
//! its timers here and the host advances the clock once per animation frame.
//! Tests advance it by hand.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Repeat {
    Once,
    Every(f64),
}

#[derive(Clone, Debug)]
struct Timer<T> {
    id: TimerId,
    due: f64,
    repeat: Repeat,
    tag: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u32,
    timers: Vec<Timer<T>>,
}

impl<T: Copy> Scheduler<T> {
    pub fn new(now: f64) -> Self {
        Self {
            now,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Fire `tag` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: f64, tag: T) -> TimerId {
        self.push(delay_ms, Repeat::Once, tag)
    }

    /// Fire `tag` every `period_ms`, first time one period from now.
    pub fn schedule_every(&mut self, period_ms: f64, tag: T) -> TimerId {
        // A zero period would spin forever inside `pop_due`.
        let period = period_ms.max(1.0);
        self.push(period, Repeat::Every(period), tag)
    }

    fn push(&mut self, delay_ms: f64, repeat: Repeat, tag: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.push(Timer {
            id,
            due: self.now + delay_ms.max(0.0),
            repeat,
            tag,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of timers that would still fire.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its
    /// due time. Interval timers are re-armed before being returned, so a
    /// handler may cancel them.
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: f64) -> Option<(TimerId, T)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)))
            .map(|(i, _)| i)?;

        let (id, due, repeat, tag) = {
            let t = &self.timers[idx];
            (t.id, t.due, t.repeat, t.tag)
        };
        if due > self.now {
            self.now = due;
        }
        match repeat {
            Repeat::Once => {
                self.timers.remove(idx);
            }
            Repeat::Every(period) => self.timers[idx].due += period,
        }
        Some((id, tag))
    }

    /// Move the clock forward without firing anything. Call after draining `pop_due`.
    pub fn set_now(&mut self, now: f64) {
        if now > self.now {
            self.now = now;
        }
    }
}
