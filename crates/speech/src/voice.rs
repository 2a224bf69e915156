/// Describes a voice installed on the synthesis engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Voice {
    /// Human-readable name of the voice.
    pub name: String,
    /// BCP 47 language tag of the voice, e.g. `en-US`.
    pub language: String,
}

impl Voice {
    /// Creates a voice descriptor.
    #[inline]
    pub fn new<N: Into<String>, L: Into<String>>(name: N, language: L) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Prosody settings applied to synthesized speech.
///
/// All values are multipliers relative to the engine's own baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceSettings {
    /// Speaking rate.
    pub rate: f32,
    /// Voice pitch.
    pub pitch: f32,
    /// Output volume.
    pub volume: f32,
}

impl Default for VoiceSettings {
    #[inline]
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// A single piece of text to be rendered as speech.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    /// The text to speak.
    pub text: String,
    /// The voice to speak with, or `None` for the engine default.
    pub voice: Option<Voice>,
    /// Prosody settings for this utterance.
    pub settings: VoiceSettings,
}

impl Utterance {
    /// Creates an utterance with default settings and the default voice.
    #[inline]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            voice: None,
            settings: VoiceSettings::default(),
        }
    }
}
