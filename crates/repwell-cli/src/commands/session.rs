use std::io::BufRead;

use clap::Subcommand;
use repwell_core::storage::{Config, Database};
use repwell_core::{
    Event, SessionCommand, SessionDriver, SessionHandle, SessionPhase, SessionRuntime,
    SpeechBackend, SpeechOutput, Voice,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a plan interactively
    Run {
        /// Plan id
        plan_id: String,
        /// Disable the countdown timer for this session
        #[arg(long)]
        no_timer: bool,
        /// Countdown duration in seconds (overrides config)
        #[arg(long)]
        duration: Option<u32>,
        /// Silence spoken cues for this session
        #[arg(long)]
        mute: bool,
    },
}

/// "Speech" for a terminal: cues are printed, not spoken.
struct TerminalSpeech;

impl SpeechBackend for TerminalSpeech {
    fn speak(&mut self, text: &str, _voice: Option<&Voice>) {
        println!("  >> {text}");
    }

    fn cancel(&mut self) {}

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run {
            plan_id,
            no_timer,
            duration,
            mute,
        } => run_session(plan_id, no_timer, duration, mute),
    }
}

fn run_session(
    plan_id: String,
    no_timer: bool,
    duration: Option<u32>,
    mute: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    let speech = if mute || !config.voice.enabled {
        SpeechOutput::muted()
    } else {
        SpeechOutput::with_language(Box::new(TerminalSpeech), &config.voice.language)
    };

    let mut runtime = SessionRuntime::new(plan_id.as_str(), db, speech);
    runtime.set_timer_enabled(config.timer.enabled && !no_timer);
    runtime.set_timer_duration(duration.unwrap_or(config.timer.duration_secs));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        runtime.load().await?;
        runtime.start().await?;
        runtime.drain_events();
        print_position(&runtime);
        println!("commands: tap (enter), n(ext), p(rev), q(uit), timer on|off, voice on|off");

        let (driver, handle) = SessionDriver::new(runtime);
        spawn_input_thread(handle.clone());

        let done = handle.clone();
        let runtime = driver
            .run(move |rt, events| {
                for event in events {
                    match event {
                        Event::RepetitionCounted {
                            completed,
                            repetitions,
                            ..
                        } => println!("  {completed}/{repetitions}"),
                        Event::ExerciseCompleted { .. } => println!("  exercise complete"),
                        Event::ExerciseChanged { .. } => print_position(rt),
                        Event::SessionCompleted { .. } => {
                            println!("session complete");
                            done.exit();
                        }
                        _ => {}
                    }
                }
            })
            .await;

        if runtime.phase() != SessionPhase::Completed {
            println!("session left at {:.0}%", runtime.progress());
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

fn print_position(runtime: &SessionRuntime<Database>) {
    let Some(current) = runtime.current() else {
        return;
    };
    println!(
        "[{}/{}] {}  target {} reps",
        runtime.current_index() + 1,
        runtime.exercises().len(),
        current.exercise.name(),
        current.repetitions,
    );
}

fn spawn_input_thread(handle: SessionHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "" | "t" | "tap" => handle.tap(),
                "n" | "next" => handle.next(),
                "p" | "prev" => handle.previous(),
                "q" | "quit" | "exit" => {
                    handle.exit();
                    break;
                }
                "timer on" => handle.send(SessionCommand::SetTimerEnabled(true)),
                "timer off" => handle.send(SessionCommand::SetTimerEnabled(false)),
                "voice on" => handle.send(SessionCommand::SetVoiceEnabled(true)),
                "voice off" => handle.send(SessionCommand::SetVoiceEnabled(false)),
                other => eprintln!("unknown command: {other}"),
            }
        }
    });
}
