use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Measures how long the user spends on the question currently shown.
#[derive(Debug, Clone, Copy)]
pub struct QuestionTimer {
    started_at: DateTime<Utc>,
}

impl QuestionTimer {
    #[must_use]
    pub fn start(clock: &Clock) -> Self {
        Self {
            started_at: clock.now(),
        }
    }

    /// Restart the timer, e.g. when the next question is displayed.
    pub fn restart(&mut self, clock: &Clock) {
        self.started_at = clock.now();
    }

    /// Whole seconds elapsed since the timer started. Never negative.
    #[must_use]
    pub fn elapsed_secs(&self, clock: &Clock) -> u32 {
        let secs = (clock.now() - self.started_at).num_seconds().max(0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Render seconds as `m:ss`.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
