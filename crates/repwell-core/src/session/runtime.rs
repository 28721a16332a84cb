//! Exercise session state machine.
//!
//! Owns the ordered exercise list, the current position, the countdown timer
//! and the speech output, and drives repetition counting, auto-advance and
//! session completion against the plan gateway.
//!
//! ## Phases
//!
//! ```text
//! Loading -> Ready -> Started -> Completed
//! ```
//!
//! The runtime is single-owner: every mutation happens through `&mut self`
//! from one logical task. Deferred work (timer ticks, the release grace
//! delay, the auto-advance delay) is returned to the caller as a
//! [`Followup`]; the async driver sleeps and delivers it back. Each followup
//! carries the epoch current when it was scheduled, so anything cancelled in
//! the meantime self-discards on delivery.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use crate::error::{CoreError, LoadError, SessionError};
use crate::events::Event;
use crate::gateway::PlanGateway;
use crate::model::{ExerciseId, Plan, PlanStatus};
use crate::session::exercise::{ExerciseRef, SessionExercise};
use crate::speech::SpeechOutput;
use crate::timer::{CountdownTimer, TickOutcome, GRACE, TICK};

/// Delay between an exercise reaching its target and the automatic move to
/// the next one.
pub const AUTO_ADVANCE: Duration = Duration::from_millis(800);

/// Cue spoken when the countdown reaches zero.
pub const RELEASE_CUE: &str = "Release";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Started,
    Completed,
}

/// Work the driver must schedule on the runtime's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Deliver [`SessionRuntime::timer_tick`] with this epoch after `after`.
    TimerTick { epoch: u64, after: Duration },
    /// Deliver [`SessionRuntime::timer_release`] with this epoch after `after`.
    TimerRelease { epoch: u64, after: Duration },
    /// Deliver [`SessionRuntime::auto_advance`] with this marker after `after`.
    AutoAdvance { nav: u64, after: Duration },
}

/// One in-progress execution of a plan's exercises.
pub struct SessionRuntime<G: PlanGateway> {
    gateway: G,
    speech: SpeechOutput,
    timer: CountdownTimer,
    plan_id: ExerciseId,
    plan: Option<Plan>,
    exercises: Vec<SessionExercise>,
    index: usize,
    phase: SessionPhase,
    /// Bumped on every navigation; pending auto-advance callbacks carry the
    /// value current when they were scheduled.
    nav_epoch: u64,
    events: Vec<Event>,
}

impl<G: PlanGateway> SessionRuntime<G> {
    pub fn new(plan_id: impl Into<ExerciseId>, gateway: G, speech: SpeechOutput) -> Self {
        Self {
            gateway,
            speech,
            timer: CountdownTimer::default(),
            plan_id: plan_id.into(),
            plan: None,
            exercises: Vec::new(),
            index: 0,
            phase: SessionPhase::Loading,
            nav_epoch: 0,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// The exercise at the current position; `None` once the session is
    /// completed (or before it loads).
    pub fn current(&self) -> Option<&SessionExercise> {
        if self.phase == SessionPhase::Completed {
            return None;
        }
        self.exercises.get(self.index)
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    /// Completed-exercise percentage, 0 for an empty list. Display only --
    /// transition decisions use the index and per-exercise completion.
    pub fn progress(&self) -> f64 {
        if self.exercises.is_empty() {
            return 0.0;
        }
        let complete = self.exercises.iter().filter(|e| e.is_complete()).count();
        complete as f64 / self.exercises.len() as f64 * 100.0
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Fetch the plan and the exercise catalog concurrently and build the
    /// working exercise list. Either fetch failing fails the load; a plan
    /// entry missing from the catalog degrades to an explicit placeholder.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        if self.phase != SessionPhase::Loading {
            return Err(SessionError::NotReady("session already loaded").into());
        }

        let (plan, catalog) = tokio::join!(
            self.gateway.fetch_plan(&self.plan_id),
            self.gateway.fetch_all_exercises(),
        );
        let plan = plan.map_err(|source| LoadError::Plan {
            id: self.plan_id.to_string(),
            source,
        })?;
        let catalog = catalog.map_err(|source| LoadError::Catalog { source })?;

        self.exercises = plan
            .exercises
            .iter()
            .map(|pe| {
                let found = catalog.iter().find(|ex| ex.id == pe.exercise_id);
                let exercise = match found {
                    Some(ex) => ExerciseRef::Found(ex.clone()),
                    None => {
                        warn!(exercise_id = %pe.exercise_id, "plan references exercise missing from catalog");
                        ExerciseRef::Missing {
                            exercise_id: pe.exercise_id.clone(),
                        }
                    }
                };
                SessionExercise::new(exercise, pe.repetitions)
            })
            .collect();

        self.events.push(Event::SessionLoaded {
            plan_id: plan.id.clone(),
            exercise_count: self.exercises.len(),
            at: Utc::now(),
        });
        self.plan = Some(plan);
        self.phase = SessionPhase::Ready;
        Ok(())
    }

    /// Begin the session. The local transition commits first; the plan
    /// status update is best-effort and a failure is only logged.
    pub async fn start(&mut self) -> Result<(), CoreError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady("session is not ready to start").into());
        }
        self.phase = SessionPhase::Started;
        self.events.push(Event::SessionStarted {
            plan_id: self.plan_id.clone(),
            at: Utc::now(),
        });

        if let Err(source) = self
            .gateway
            .update_plan_status(&self.plan_id, PlanStatus::Active)
            .await
        {
            let error = SessionError::StatusSync { source };
            warn!(plan_id = %self.plan_id, error = %error, "plan status sync failed");
        }
        Ok(())
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// The primary interaction: one tap on the counter.
    ///
    /// With the timer enabled the tap arms the countdown and the repetition
    /// is counted at release; with it disabled the tap counts directly.
    pub fn register_tap(&mut self) -> Option<Followup> {
        if self.phase != SessionPhase::Started || self.current().is_none() {
            return None;
        }
        if self.timer.enabled() {
            let started = self.timer.start()?;
            self.speech.speak(&started.announce.to_string());
            self.events.push(Event::TimerStarted {
                duration_secs: self.timer.duration_secs(),
                at: Utc::now(),
            });
            Some(Followup::TimerTick {
                epoch: started.epoch,
                after: TICK,
            })
        } else {
            self.count_repetition()
        }
    }

    /// Deliver a scheduled one-second tick.
    pub fn timer_tick(&mut self, epoch: u64) -> Option<Followup> {
        match self.timer.tick(epoch) {
            TickOutcome::Stale => None,
            TickOutcome::Cue(value) => {
                self.speech.speak(&value.to_string());
                self.events.push(Event::TimerTicked {
                    remaining_secs: value,
                    at: Utc::now(),
                });
                Some(Followup::TimerTick { epoch, after: TICK })
            }
            TickOutcome::Release => {
                self.speech.speak(RELEASE_CUE);
                self.events.push(Event::TimerExpired { at: Utc::now() });
                Some(Followup::TimerRelease {
                    epoch,
                    after: GRACE,
                })
            }
        }
    }

    /// Deliver the scheduled post-grace completion: count the repetition the
    /// countdown paced.
    pub fn timer_release(&mut self, epoch: u64) -> Option<Followup> {
        if !self.timer.release(epoch) {
            return None;
        }
        self.count_repetition()
    }

    fn count_repetition(&mut self) -> Option<Followup> {
        let index = self.index;
        let exercise = self.exercises.get_mut(index)?;
        let became_complete = exercise.increment();
        self.events.push(Event::RepetitionCounted {
            exercise_index: index,
            completed: exercise.completed(),
            repetitions: exercise.repetitions,
            at: Utc::now(),
        });
        if !became_complete {
            return None;
        }
        self.events.push(Event::ExerciseCompleted {
            exercise_index: index,
            at: Utc::now(),
        });
        Some(Followup::AutoAdvance {
            nav: self.nav_epoch,
            after: AUTO_ADVANCE,
        })
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Deliver a scheduled auto-advance. Discarded when any navigation
    /// happened after it was scheduled.
    pub async fn auto_advance(&mut self, nav: u64) -> Result<(), CoreError> {
        if nav != self.nav_epoch {
            return Ok(());
        }
        self.advance().await
    }

    /// Move to the next exercise, or complete the session at the last one.
    /// Always stops the timer first; idempotent once completed.
    pub async fn advance(&mut self) -> Result<(), CoreError> {
        if self.phase == SessionPhase::Completed {
            return Ok(());
        }
        self.cancel_pending();
        if self.index + 1 < self.exercises.len() {
            self.index += 1;
            self.events.push(Event::ExerciseChanged {
                exercise_index: self.index,
                at: Utc::now(),
            });
            Ok(())
        } else {
            self.complete_session().await
        }
    }

    /// Move back one exercise; no-op at the first.
    pub fn retreat(&mut self) {
        self.cancel_pending();
        if self.index > 0 {
            self.index -= 1;
            self.events.push(Event::ExerciseChanged {
                exercise_index: self.index,
                at: Utc::now(),
            });
        }
    }

    /// Mark the plan completed through the gateway. On failure the session
    /// stays `Started` and the caller may retry; completion is never claimed
    /// locally without the gateway's confirmation.
    pub async fn complete_session(&mut self) -> Result<(), CoreError> {
        if self.phase == SessionPhase::Completed {
            return Ok(());
        }
        match self.gateway.mark_plan_completed(&self.plan_id).await {
            Ok(()) => {
                self.phase = SessionPhase::Completed;
                self.events.push(Event::SessionCompleted {
                    plan_id: self.plan_id.clone(),
                    at: Utc::now(),
                });
                Ok(())
            }
            Err(source) => {
                error!(plan_id = %self.plan_id, error = %source, "failed to mark plan completed");
                Err(SessionError::Completion { source }.into())
            }
        }
    }

    /// Tear the session down: stop the timer, silence speech. Safe to call
    /// from any phase, any number of times.
    pub fn exit(&mut self) {
        self.cancel_pending();
        self.speech.cancel();
        self.events.push(Event::SessionExited { at: Utc::now() });
    }

    // ── Preferences ──────────────────────────────────────────────────

    /// Toggle the countdown feature. Disabling stops a running countdown
    /// synchronously.
    pub fn set_timer_enabled(&mut self, enabled: bool) {
        self.timer.set_enabled(enabled);
        if !enabled {
            self.speech.cancel();
        }
    }

    pub fn set_timer_duration(&mut self, duration_secs: u32) {
        self.timer.set_duration(duration_secs);
    }

    /// Toggle spoken cues. Disabling cancels in-flight speech.
    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.speech.set_enabled(enabled);
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Cancellation barrier ahead of any navigation: stale timer callbacks
    /// and pending auto-advances must not land on the new position.
    fn cancel_pending(&mut self) {
        self.nav_epoch += 1;
        let was_running = self.timer.state() != crate::timer::TimerState::Idle;
        self.timer.stop();
        if was_running {
            self.speech.cancel();
            self.events.push(Event::TimerStopped { at: Utc::now() });
        }
    }
}
