mod driver;
mod exercise;
mod runtime;

pub use driver::{SessionCommand, SessionDriver, SessionHandle};
pub use exercise::{ExerciseRef, SessionExercise};
pub use runtime::{Followup, SessionPhase, SessionRuntime, AUTO_ADVANCE, RELEASE_CUE};
