// Audio module - playback clock and real-time input hand-off

pub mod clock;
pub mod input_queue;

pub use clock::PlaybackClock;
pub use input_queue::{
    InputEvent, InputKind, InputQueue, InputReceiver, InputSender, DEFAULT_INPUT_CAPACITY,
};
