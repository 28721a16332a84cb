//! Spoken-cue output port.
//!
//! The session never talks to a platform speech engine directly; it is handed
//! a [`SpeechBackend`] capability so tests can inject a fake. Correctness
//! contract: at most one utterance audible at a time (no queueing), `cancel`
//! is idempotent, and disabling the voice cancels whatever is in flight.
//! Voice selection is a presentation concern with a fixed preference order.

/// A voice offered by the backing speech engine.
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: String,
    pub name: String,
    /// BCP-47 language tag, e.g. `en-US`.
    pub lang: String,
}

/// Abstract speech-output capability.
pub trait SpeechBackend: Send {
    /// Begin speaking `text` with the given voice (backend default if `None`).
    /// Callers cancel first; backends need not queue.
    fn speak(&mut self, text: &str, voice: Option<&Voice>);

    /// Stop any in-flight utterance. Idempotent.
    fn cancel(&mut self);

    /// Voices available for selection. May be empty.
    fn voices(&self) -> Vec<Voice>;
}

/// Backend that swallows everything. Used when no speech engine is wired up.
#[derive(Debug, Default)]
pub struct NullBackend;

impl SpeechBackend for NullBackend {
    fn speak(&mut self, _text: &str, _voice: Option<&Voice>) {}
    fn cancel(&mut self) {}
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

/// Preferred voice for a language prefix (usually `"en"`): a matching voice
/// tagged or named as female, else any matching voice, else the backend
/// default.
pub fn pick_voice(voices: &[Voice], language: &str) -> Option<Voice> {
    let prefix = language.to_ascii_lowercase();
    let matches = |v: &&Voice| v.lang.to_ascii_lowercase().starts_with(&prefix);
    voices
        .iter()
        .filter(matches)
        .find(|v| v.name.to_ascii_lowercase().contains("female"))
        .or_else(|| voices.iter().find(matches))
        .cloned()
}

/// User-facing speech output: a backend plus the voice-enabled toggle.
pub struct SpeechOutput {
    backend: Box<dyn SpeechBackend>,
    voice: Option<Voice>,
    enabled: bool,
}

impl SpeechOutput {
    pub fn new(backend: Box<dyn SpeechBackend>) -> Self {
        Self::with_language(backend, "en")
    }

    pub fn with_language(backend: Box<dyn SpeechBackend>, language: &str) -> Self {
        let voice = pick_voice(&backend.voices(), language);
        Self {
            backend,
            voice,
            enabled: true,
        }
    }

    pub fn muted() -> Self {
        Self::new(Box::new(NullBackend))
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Speak a short cue. No-op while disabled; otherwise the in-flight
    /// utterance is cancelled first so cues never queue up.
    pub fn speak(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        self.backend.cancel();
        self.backend.speak(text, self.voice.as_ref());
    }

    pub fn cancel(&mut self) {
        self.backend.cancel();
    }

    /// Toggling to disabled cancels any in-flight utterance.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.backend.cancel();
        }
    }
}

impl std::fmt::Debug for SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOutput")
            .field("enabled", &self.enabled)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::{Arc, Mutex};

    use super::{SpeechBackend, Voice};

    /// Records every backend call for assertion in tests.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub log: Arc<Mutex<Vec<String>>>,
        pub voices: Vec<Voice>,
    }

    impl RecordingBackend {
        pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let backend = Self::default();
            let log = backend.log.clone();
            (backend, log)
        }
    }

    impl SpeechBackend for RecordingBackend {
        fn speak(&mut self, text: &str, _voice: Option<&Voice>) {
            self.log.lock().unwrap().push(format!("speak:{text}"));
        }

        fn cancel(&mut self) {
            self.log.lock().unwrap().push("cancel".into());
        }

        fn voices(&self) -> Vec<Voice> {
            self.voices.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::RecordingBackend;
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice {
            id: name.to_string(),
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    #[test]
    fn prefers_english_female_then_english_then_default() {
        let voices = vec![
            voice("Thomas", "fr-FR"),
            voice("Daniel", "en-GB"),
            voice("Samantha (female)", "en-US"),
        ];
        assert_eq!(pick_voice(&voices, "en").unwrap().name, "Samantha (female)");

        let voices = vec![voice("Thomas", "fr-FR"), voice("Daniel", "en-GB")];
        assert_eq!(pick_voice(&voices, "en").unwrap().name, "Daniel");

        assert!(pick_voice(&[voice("Thomas", "fr-FR")], "en").is_none());
        assert!(pick_voice(&[], "en").is_none());
    }

    #[test]
    fn speak_cancels_previous_utterance() {
        let (backend, log) = RecordingBackend::new();
        let mut speech = SpeechOutput::new(Box::new(backend));
        speech.speak("5");
        speech.speak("4");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["cancel", "speak:5", "cancel", "speak:4"]
        );
    }

    #[test]
    fn disabled_output_is_silent_and_cancels() {
        let (backend, log) = RecordingBackend::new();
        let mut speech = SpeechOutput::new(Box::new(backend));
        speech.speak("5");
        speech.set_enabled(false);
        speech.speak("4");
        let entries = log.lock().unwrap();
        // The disable cancelled in-flight speech; the later speak was a no-op.
        assert_eq!(*entries, vec!["cancel", "speak:5", "cancel"]);
    }
}
