//! Value objects - Immutable objects defined by their attributes

mod attributes;
mod geometry;
mod names;
mod sound_effect;

pub use attributes::{strip_layout_keys, Attributes, LAYOUT_KEYS};
pub use geometry::{Position, Route};
pub use names::GameName;
pub use sound_effect::SoundEffect;
