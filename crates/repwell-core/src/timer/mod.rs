mod countdown;

pub use countdown::{
    CountdownTimer, TickOutcome, TimerStart, TimerState, DEFAULT_DURATION_SECS, GRACE, TICK,
};
