use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    time::Duration,
};

/// Virtual monotonic clock. Time only moves when the host advances it, which
/// keeps every sequence reproducible under test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    now: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward to `time`. Earlier timestamps are ignored.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

/// Identifies one scheduled action. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// An action that has come due, as handed back by [`Scheduler::pop_due`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<A> {
    pub due: Duration,
    pub handle: TimerHandle,
    pub action: A,
}

/// Delayed, cancellable one-shot actions on a virtual clock.
///
/// Actions fire in due-time order; actions sharing a due time fire in the
/// order they were scheduled.
pub struct Scheduler<A> {
    clock: PlaybackClock,
    events: BTreeMap<(Duration, TimerHandle), A>,
    due_times: HashMap<TimerHandle, Duration>,
    next_handle: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            clock: PlaybackClock::new(),
            events: BTreeMap::new(),
            due_times: HashMap::new(),
            next_handle: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Schedules `action` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, action: A) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let due = self.clock.now() + delay;
        self.events.insert((due, handle), action);
        self.due_times.insert(handle, due);
        handle
    }

    /// Removes a pending action. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.due_times.remove(&handle) {
            Some(due) => self.events.remove(&(due, handle)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_times.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.events.keys().next().map(|(due, _)| *due)
    }

    /// Takes the earliest action due at or before `until`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<ScheduledEvent<A>> {
        let key = *self.events.keys().next()?;
        if key.0 > until {
            return None;
        }

        let action = self.events.remove(&key)?;
        self.due_times.remove(&key.1);
        self.clock.advance_to(key.0);

        Some(ScheduledEvent {
            due: key.0,
            handle: key.1,
            action,
        })
    }

    /// Moves the clock to `time` without firing anything.
    pub fn advance_clock_to(&mut self, time: Duration) {
        self.clock.advance_to(time);
    }
}

impl<A> fmt::Debug for Scheduler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.clock.now())
            .field("pending", &self.events.len())
            .finish()
    }
}
