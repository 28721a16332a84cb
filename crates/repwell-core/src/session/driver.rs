//! Async shell around [`SessionRuntime`].
//!
//! One task owns the runtime and processes [`SessionCommand`]s from a single
//! mpsc channel: user interactions arrive through a [`SessionHandle`], and
//! deferred work (timer ticks, the release grace delay, auto-advance) is
//! spawned as a sleeper that sends its epoch-stamped command back over the
//! same channel. Everything the runtime mutates therefore happens in one
//! place, in arrival order -- a manual "next" queued ahead of an in-flight
//! tick stops the timer before the tick lands, and the tick self-discards.

use tokio::sync::mpsc;

use crate::events::Event;
use crate::gateway::PlanGateway;
use crate::session::runtime::{Followup, SessionRuntime};

/// Commands accepted by the session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Tap,
    Next,
    Previous,
    Exit,
    SetTimerEnabled(bool),
    SetVoiceEnabled(bool),
    SetTimerDuration(u32),
    TimerTick { epoch: u64 },
    TimerRelease { epoch: u64 },
    AutoAdvance { nav: u64 },
}

/// Cloneable sender half handed to whatever UI drives the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) {
        // The driver dropping its receiver means the session is over;
        // commands sent after that are meaningless.
        let _ = self.tx.send(command);
    }

    pub fn tap(&self) {
        self.send(SessionCommand::Tap);
    }

    pub fn next(&self) {
        self.send(SessionCommand::Next);
    }

    pub fn previous(&self) {
        self.send(SessionCommand::Previous);
    }

    pub fn exit(&self) {
        self.send(SessionCommand::Exit);
    }
}

/// Owns a started runtime and pumps commands until `Exit`.
pub struct SessionDriver<G: PlanGateway> {
    runtime: SessionRuntime<G>,
    tx: mpsc::UnboundedSender<SessionCommand>,
    rx: mpsc::UnboundedReceiver<SessionCommand>,
}

impl<G: PlanGateway> SessionDriver<G> {
    pub fn new(runtime: SessionRuntime<G>) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle { tx: tx.clone() };
        (Self { runtime, tx, rx }, handle)
    }

    /// Process commands until `Exit` arrives (or every handle is dropped).
    /// `observer` runs after each command with the events it produced.
    /// Returns the runtime for final inspection.
    pub async fn run(
        mut self,
        mut observer: impl FnMut(&SessionRuntime<G>, &[Event]),
    ) -> SessionRuntime<G> {
        while let Some(command) = self.rx.recv().await {
            let exit = matches!(command, SessionCommand::Exit);
            if let Some(followup) = self.dispatch(command).await {
                self.schedule(followup);
            }
            let events = self.runtime.drain_events();
            observer(&self.runtime, &events);
            if exit {
                break;
            }
        }
        self.runtime
    }

    async fn dispatch(&mut self, command: SessionCommand) -> Option<Followup> {
        match command {
            SessionCommand::Tap => self.runtime.register_tap(),
            SessionCommand::Next => {
                // Completion failure is logged by the runtime and the
                // session stays retryable; the driver keeps running.
                let _ = self.runtime.advance().await;
                None
            }
            SessionCommand::Previous => {
                self.runtime.retreat();
                None
            }
            SessionCommand::Exit => {
                self.runtime.exit();
                None
            }
            SessionCommand::SetTimerEnabled(enabled) => {
                self.runtime.set_timer_enabled(enabled);
                None
            }
            SessionCommand::SetVoiceEnabled(enabled) => {
                self.runtime.set_voice_enabled(enabled);
                None
            }
            SessionCommand::SetTimerDuration(secs) => {
                self.runtime.set_timer_duration(secs);
                None
            }
            SessionCommand::TimerTick { epoch } => self.runtime.timer_tick(epoch),
            SessionCommand::TimerRelease { epoch } => self.runtime.timer_release(epoch),
            SessionCommand::AutoAdvance { nav } => {
                let _ = self.runtime.auto_advance(nav).await;
                None
            }
        }
    }

    fn schedule(&self, followup: Followup) {
        let (after, command) = match followup {
            Followup::TimerTick { epoch, after } => (after, SessionCommand::TimerTick { epoch }),
            Followup::TimerRelease { epoch, after } => {
                (after, SessionCommand::TimerRelease { epoch })
            }
            Followup::AutoAdvance { nav, after } => (after, SessionCommand::AutoAdvance { nav }),
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(command);
        });
    }
}
