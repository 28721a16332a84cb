//! Per-exercise progress record for one session.

use serde::{Deserialize, Serialize};

use crate::model::{Exercise, ExerciseId};

/// Resolved exercise reference.
///
/// A plan may reference a catalog entry that no longer exists; the session
/// keeps the slot with an explicit `Missing` marker instead of failing the
/// load or carrying a null-like reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseRef {
    Found(Exercise),
    Missing { exercise_id: ExerciseId },
}

impl ExerciseRef {
    pub fn is_missing(&self) -> bool {
        matches!(self, ExerciseRef::Missing { .. })
    }

    /// Display name; missing entries render as a placeholder.
    pub fn name(&self) -> String {
        match self {
            ExerciseRef::Found(ex) => ex.name.clone(),
            ExerciseRef::Missing { exercise_id } => {
                format!("Unknown exercise ({exercise_id})")
            }
        }
    }
}

/// The session's working unit: one exercise, its target, and progress so far.
///
/// Invariant: `0 <= completed <= repetitions`, and `is_complete()` is true
/// iff `completed == repetitions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    pub exercise: ExerciseRef,
    pub repetitions: u32,
    completed: u32,
}

impl SessionExercise {
    pub fn new(exercise: ExerciseRef, repetitions: u32) -> Self {
        Self {
            exercise,
            repetitions,
            completed: 0,
        }
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.repetitions
    }

    /// Count one repetition, saturating at the target.
    ///
    /// Returns `true` only on the call where the exercise first becomes
    /// complete; repeated calls afterwards are no-ops and return `false`.
    pub fn increment(&mut self) -> bool {
        if self.completed >= self.repetitions {
            return false;
        }
        self.completed += 1;
        self.completed == self.repetitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Exercise;
    use proptest::prelude::*;

    fn found(reps: u32) -> SessionExercise {
        SessionExercise::new(
            ExerciseRef::Found(Exercise {
                id: ExerciseId::new("1"),
                name: "Shoulder roll".into(),
                description: String::new(),
                rationale: String::new(),
            }),
            reps,
        )
    }

    #[test]
    fn completes_exactly_at_target() {
        let mut ex = found(3);
        assert!(!ex.increment());
        assert!(!ex.increment());
        assert!(ex.increment());
        assert!(ex.is_complete());
    }

    #[test]
    fn saturates_silently_past_target() {
        let mut ex = found(2);
        ex.increment();
        assert!(ex.increment());
        // Edge-triggered: completion must not re-fire.
        assert!(!ex.increment());
        assert!(!ex.increment());
        assert_eq!(ex.completed(), 2);
    }

    #[test]
    fn zero_target_is_instantly_complete() {
        let mut ex = found(0);
        assert!(ex.is_complete());
        assert!(!ex.increment());
        assert_eq!(ex.completed(), 0);
    }

    #[test]
    fn missing_ref_renders_placeholder() {
        let missing = ExerciseRef::Missing {
            exercise_id: ExerciseId::new("9"),
        };
        assert!(missing.is_missing());
        assert_eq!(missing.name(), "Unknown exercise (9)");
    }

    proptest! {
        /// Bounds hold after any sequence of increments, and completion
        /// fires exactly once iff the target is reachable.
        #[test]
        fn increment_respects_bounds(reps in 0u32..100, attempts in 0usize..300) {
            let mut ex = found(reps);
            let mut completions = 0u32;
            for _ in 0..attempts {
                if ex.increment() {
                    completions += 1;
                }
                prop_assert!(ex.completed() <= ex.repetitions);
                prop_assert_eq!(ex.is_complete(), ex.completed() == ex.repetitions);
            }
            prop_assert_eq!(ex.completed(), (attempts as u32).min(reps));
            let expected = u32::from(reps > 0 && attempts as u32 >= reps);
            prop_assert_eq!(completions, expected);
        }
    }
}
