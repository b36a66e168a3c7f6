//! The stock processors.
mod clip;
mod event_converter;
mod event_to_audio;
mod identity;
mod level_meter;
mod mix;
mod multiply;
mod mute_solo;
mod pan;
mod select;
mod stream;
mod value;

pub use clip::Clip;
pub use event_converter::EventConverter;
pub use event_to_audio::{EventToAudio, DEFAULT_SMOOTH_LENGTH};
pub use identity::{EventIdentity, Identity, EVENT_IDENTITY};
pub use level_meter::{LevelMeter, LevelMeterProcessor, MIN_LEVEL};
pub use mix::Mix;
pub use multiply::Multiply;
pub use mute_solo::MuteSolo;
pub use pan::{balance_gains, pan_gains, Pan, PanLaw};
pub use select::Select;
pub use stream::{StreamProcessor, StreamReader};
pub use value::{
    value_input, value_io, value_output, ValueInput, ValueInputProcessor, ValueIo,
    ValueIoProcessor, ValueOutput, ValueOutputProcessor,
};
