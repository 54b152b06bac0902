// InputQueue - lock-free hand-off of player input to the judgement loop
//
// Input sources (touch/keyboard handlers) own the producer half; the play
// session owns the consumer half and drains it once per tick. Both halves
// are rtrb SPSC ring buffers, so pushes never block and never allocate.
//
// A full queue drops the new event and logs a warning; the dropped lane is
// reported so the caller can surface it through telemetry.

use rtrb::{Consumer, Producer, RingBuffer};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Press,
    Release,
}

/// One player action with its playback timestamp in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub lane: usize,
    pub kind: InputKind,
    pub timestamp: f64,
}

impl InputEvent {
    pub fn press(lane: usize, timestamp: f64) -> Self {
        Self {
            lane,
            kind: InputKind::Press,
            timestamp,
        }
    }

    pub fn release(lane: usize, timestamp: f64) -> Self {
        Self {
            lane,
            kind: InputKind::Release,
            timestamp,
        }
    }
}

/// Producer half, owned by the input source
pub struct InputSender {
    producer: Producer<InputEvent>,
}

impl InputSender {
    /// Queue an event
    ///
    /// # Returns
    /// `false` if the queue was full and the event was dropped
    pub fn push(&mut self, event: InputEvent) -> bool {
        match self.producer.push(event) {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "[InputQueue] Queue full, dropped {:?} on lane {} at {:.3}s",
                    event.kind,
                    event.lane,
                    event.timestamp
                );
                false
            }
        }
    }
}

/// Consumer half, owned by the play session
pub struct InputReceiver {
    consumer: Consumer<InputEvent>,
    capacity: usize,
}

impl InputReceiver {
    /// Pop every queued event in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(self.consumer.slots());
        while let Ok(event) = self.consumer.pop() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.consumer.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Fill level in percent
    pub fn occupancy_percent(&self) -> f32 {
        self.len() as f32 / self.capacity as f32 * 100.0
    }
}

pub struct InputQueue;

impl InputQueue {
    /// Create a queue holding up to `capacity` events
    ///
    /// # Arguments
    /// * `capacity` - Ring size; 0 is clamped to 1
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> (InputSender, InputReceiver) {
        let capacity = capacity.max(1);
        let (producer, consumer) = RingBuffer::new(capacity);
        (
            InputSender { producer },
            InputReceiver { consumer, capacity },
        )
    }
}
