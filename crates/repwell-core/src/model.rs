//! Plan and exercise data model.
//!
//! Identities crossing the gateway boundary are opaque: document stores hand
//! back numeric ids in some records and string ids in others, so [`ExerciseId`]
//! normalizes everything to a string before comparison.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Opaque exercise (or plan) identity, compared by normalized string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "IdRepr")]
pub struct ExerciseId(String);

/// Accepts both `"9"` and `9` on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Num(i64),
    Text(String),
}

impl From<IdRepr> for ExerciseId {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Num(n) => ExerciseId(n.to_string()),
            IdRepr::Text(s) => ExerciseId(s.trim().to_string()),
        }
    }
}

impl ExerciseId {
    pub fn new(id: impl Into<String>) -> Self {
        let s: String = id.into();
        ExerciseId(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExerciseId {
    fn from(s: &str) -> Self {
        ExerciseId::new(s)
    }
}

impl From<i64> for ExerciseId {
    fn from(n: i64) -> Self {
        ExerciseId(n.to_string())
    }
}

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog exercise. Immutable once loaded into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Why the exercise is prescribed, shown alongside the description.
    #[serde(default)]
    pub rationale: String,
}

/// One entry of a plan's ordered exercise list: which exercise, how many reps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExercise {
    pub exercise_id: ExerciseId,
    pub repetitions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Instant,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Pending,
    Active,
    Completed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
        }
    }
}

/// A named, ordered set of exercises with target repetitions and a lifecycle
/// status. Mutated only through the gateway; the session never re-derives
/// status locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: ExerciseId,
    pub plan_type: PlanType,
    pub date: NaiveDate,
    /// Scheduled wall-clock time, `HH:MM`.
    pub time: String,
    pub status: PlanStatus,
    pub exercises: Vec<PlanExercise>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Plan {
    /// Sum of target repetitions across the whole plan.
    pub fn total_repetitions(&self) -> u32 {
        self.exercises.iter().map(|e| e.repetitions).sum()
    }
}
