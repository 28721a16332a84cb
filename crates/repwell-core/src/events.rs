use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ExerciseId;

/// Every state change in the session runtime produces an Event.
/// The embedding UI drains these for rendering; nothing in the core
/// makes a transition decision based on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionLoaded {
        plan_id: ExerciseId,
        exercise_count: usize,
        at: DateTime<Utc>,
    },
    SessionStarted {
        plan_id: ExerciseId,
        at: DateTime<Utc>,
    },
    RepetitionCounted {
        exercise_index: usize,
        completed: u32,
        repetitions: u32,
        at: DateTime<Utc>,
    },
    /// An exercise reached its target; auto-advance is pending.
    ExerciseCompleted {
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    ExerciseChanged {
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    TimerStarted {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the release cue fired.
    TimerExpired {
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        plan_id: ExerciseId,
        at: DateTime<Utc>,
    },
    SessionExited {
        at: DateTime<Utc>,
    },
}
