use serde::{Deserialize, Serialize};

fn default_duration() -> f64 {
    2.0
}

fn default_volume() -> f64 {
    100.0
}

/// Sound played when a trigger or connection fires.
///
/// Flattened into its owner on the wire as `sound_effect`,
/// `sound_effect_duration` and `sound_effect_volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEffect {
    /// Sound path (`global/...` or `map/...`); empty means silent.
    #[serde(rename = "sound_effect", default)]
    pub name: String,
    /// Seconds.
    #[serde(rename = "sound_effect_duration", default = "default_duration")]
    pub duration: f64,
    /// Percent, 0-100.
    #[serde(rename = "sound_effect_volume", default = "default_volume")]
    pub volume: f64,
}

impl Default for SoundEffect {
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: default_duration(),
            volume: default_volume(),
        }
    }
}
