//! Stock components.
mod amplifier;
mod identity;
mod level_meter;
mod mute_solo;
mod pan;

pub use amplifier::Amplifier;
pub use identity::Identity;
pub use level_meter::StereoLevelMeter;
pub use mute_solo::MuteSolo;
pub use pan::Pan;
