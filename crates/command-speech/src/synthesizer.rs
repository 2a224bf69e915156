use std::process::Stdio;

use parley_speech::{ErrorKind, SynthesisEngine, Utterance, Voice};
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;

use crate::{Error, LANGUAGE};

// espeak baselines the settings multipliers are applied to.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;
const BASE_AMPLITUDE: f32 = 100.0;

/// A synthesis engine that pipes text to an espeak-style program.
///
/// The program must accept espeak-compatible `-v`/`-s`/`-p`/`-a` flags
/// and read the text to speak from stdin. Playback ends when the child
/// exits.
pub struct CommandSynthesizer {
    program: String,
    voices: Vec<Voice>,
}

impl CommandSynthesizer {
    /// Creates an engine that speaks with the given program.
    #[inline]
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            voices: vec![Voice::new("default", LANGUAGE)],
        }
    }

    /// Replaces the voice inventory reported by the engine.
    #[inline]
    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }
}

impl SynthesisEngine for CommandSynthesizer {
    type Error = Error;

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(
        &self,
        utterance: &Utterance,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let program = self.program.clone();
        let args = synthesis_args(utterance);
        let text = utterance.text.clone();
        async move {
            debug!("running speaker command: {program} {args:?}");
            let mut child = Command::new(&program)
                .args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|err| {
                    Error::new(
                        format!("failed to run speaker command: {err}"),
                        ErrorKind::Other,
                    )
                })?;

            if let Some(mut stdin) = child.stdin.take() {
                // The child may exit before reading everything; playback
                // failure is judged by the exit status below.
                if let Err(err) = stdin.write_all(text.as_bytes()).await {
                    debug!("speaker command stdin closed early: {err}");
                }
            }

            let status = child.wait().await.map_err(|err| {
                Error::new(
                    format!("failed to wait for speaker command: {err}"),
                    ErrorKind::Other,
                )
            })?;
            if !status.success() {
                return Err(Error::new(
                    format!("speaker command exited with {status}"),
                    ErrorKind::Other,
                ));
            }
            Ok(())
        }
    }
}

#[inline]
fn synthesis_args(utterance: &Utterance) -> Vec<String> {
    let mut args = Vec::with_capacity(9);
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_owned());
        args.push(voice.language.to_lowercase());
    }
    let settings = &utterance.settings;
    args.push("-s".to_owned());
    args.push(scaled(BASE_WORDS_PER_MINUTE, settings.rate));
    args.push("-p".to_owned());
    args.push(scaled(BASE_PITCH, settings.pitch));
    args.push("-a".to_owned());
    args.push(scaled(BASE_AMPLITUDE, settings.volume));
    args
}

#[inline]
fn scaled(base: f32, multiplier: f32) -> String {
    ((base * multiplier).round() as u32).to_string()
}

#[cfg(test)]
mod tests {
    use parley_speech::VoiceSettings;

    use super::*;

    #[test]
    fn test_synthesis_args_mapping() {
        let mut utterance = Utterance::new("good evening");
        utterance.voice = Some(Voice::new("default", "en-US"));
        utterance.settings = VoiceSettings {
            rate: 0.9,
            pitch: 0.8,
            volume: 1.0,
        };
        assert_eq!(
            synthesis_args(&utterance),
            ["-v", "en-us", "-s", "157", "-p", "40", "-a", "100"]
        );
    }

    #[test]
    fn test_synthesis_args_without_voice() {
        let utterance = Utterance::new("hello");
        assert_eq!(
            synthesis_args(&utterance),
            ["-s", "175", "-p", "50", "-a", "100"]
        );
    }

    #[tokio::test]
    async fn test_speak_success_and_failure() {
        let utterance = Utterance::new("hello");
        // `true` ignores its input and exits cleanly, `false` does not.
        let engine = CommandSynthesizer::new("true");
        assert!(engine.speak(&utterance).await.is_ok());
        let engine = CommandSynthesizer::new("false");
        assert!(engine.speak(&utterance).await.is_err());
    }
}
