//! # Repwell Core Library
//!
//! This library provides the core business logic for Repwell, a physical
//! therapy exercise tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI being
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Runtime**: A state machine that walks a plan's exercise list,
//!   counts repetitions, and paces them with an optional countdown timer
//! - **Countdown Timer**: Epoch-guarded single-shot countdown; an async
//!   driver schedules its ticks and delivers them back
//! - **Speech Port**: Injected capability for spoken countdown cues
//! - **Gateway**: Transport-agnostic contract for plan persistence, with a
//!   local SQLite implementation
//! - **Insights**: Pure statistics reducer over completed plans
//!
//! ## Key Components
//!
//! - [`SessionRuntime`]: Core session state machine
//! - [`SessionDriver`]: Async shell that owns the runtime and its timers
//! - [`CountdownTimer`]: Repetition countdown state machine
//! - [`PlanGateway`]: Trait for plan persistence
//! - [`Database`]: Local plan and exercise storage

pub mod error;
pub mod events;
pub mod gateway;
pub mod insights;
pub mod model;
pub mod session;
pub mod speech;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, GatewayError, LoadError, SessionError};
pub use events::Event;
pub use gateway::{MemoryGateway, PlanGateway};
pub use insights::{stats, DailyActivity, InsightsStats};
pub use model::{Exercise, ExerciseId, Plan, PlanExercise, PlanStatus, PlanType};
pub use session::{
    ExerciseRef, SessionCommand, SessionDriver, SessionExercise, SessionHandle, SessionPhase,
    SessionRuntime,
};
pub use speech::{SpeechBackend, SpeechOutput, Voice};
pub use storage::{Config, Database};
pub use timer::{CountdownTimer, TimerState};
