//! # Voice ring buffer
//!
//! Holds the last `K` encoded audio frames. Every outgoing message carries
//! all `K` of them behind the newest sequence id, so the receiver rides out
//! the loss of up to `K - 1` consecutive messages without asking for
//! anything again. Staleness is decided with circular comparison of the
//! 16-bit sequence id.
//!
//! Capture and network send run on their own schedules, so the slots sit
//! behind a mutex. The lock is only held to push a frame, to copy out a
//! snapshot, or to overwrite the slots with a newer message; encoding and
//! decoding happen outside it.
//!
//! Slots rotate with each push instead of being addressed by
//! `sequence_id % K`: 65536 is not a multiple of most depths, and a modulo
//! slot would collide right at the wrap.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use log::trace;

use tether_serde::{BitReader, BitWrite, Serde};

use crate::{
    constants::MAX_VOICE_FRAME_BYTES,
    sequence_newer,
    voice::{error::VoiceError, voice_config::VoiceConfig},
    SequenceId,
};

fn empty_frame() -> Arc<[u8]> {
    Arc::from(Vec::<u8>::new())
}

struct VoiceSlots {
    latest: SequenceId,
    // oldest at the front, `latest` at the back
    frames: VecDeque<Arc<[u8]>>,
}

impl VoiceSlots {
    fn new(depth: usize, latest: SequenceId) -> Self {
        Self {
            latest,
            frames: (0..depth).map(|_| empty_frame()).collect(),
        }
    }

    fn push(&mut self, frame: Arc<[u8]>) -> SequenceId {
        self.latest = self.latest.wrapping_add(1);
        self.frames.pop_front();
        self.frames.push_back(frame);
        self.latest
    }

    fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            latest: self.latest,
            frames: self.frames.iter().cloned().collect(),
        }
    }

    fn frame(&self, sequence_id: SequenceId) -> Option<Arc<[u8]>> {
        let back = usize::from(self.latest.wrapping_sub(sequence_id));
        if back >= self.frames.len() {
            return None;
        }
        let frame = &self.frames[self.frames.len() - 1 - back];
        if frame.is_empty() {
            return None;
        }
        Some(frame.clone())
    }
}

/// The `K` frames of a buffer at one instant, oldest to newest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceSnapshot {
    latest: SequenceId,
    frames: Vec<Arc<[u8]>>,
}

impl VoiceSnapshot {
    pub fn latest_sequence_id(&self) -> SequenceId {
        self.latest
    }

    pub fn frames(&self) -> &[Arc<[u8]>] {
        &self.frames
    }

    /// `latestSequenceId`, then each frame as a length byte and its bytes
    pub fn write(&self, writer: &mut dyn BitWrite) {
        self.latest.ser(writer);
        for frame in &self.frames {
            (frame.len() as u8).ser(writer);
            writer.write_bytes(frame);
        }
    }
}

pub struct VoiceRingBuffer {
    depth: usize,
    max_frame_length: usize,
    slots: Mutex<VoiceSlots>,
}

impl VoiceRingBuffer {
    pub fn new(config: VoiceConfig) -> Self {
        Self::starting_at(config, 0)
    }

    /// A buffer whose most recent (empty) frame is `latest`. The depth is
    /// clamped to what one sequence space can address.
    pub fn starting_at(config: VoiceConfig, latest: SequenceId) -> Self {
        let depth = config.depth.clamp(1, usize::from(u16::MAX));
        Self {
            depth,
            max_frame_length: config.max_frame_length.min(MAX_VOICE_FRAME_BYTES),
            slots: Mutex::new(VoiceSlots::new(depth, latest)),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn lock(&self) -> Result<MutexGuard<'_, VoiceSlots>, VoiceError> {
        self.slots.lock().map_err(|_| VoiceError::LockPoisoned)
    }

    /// Get the most recent sequence id
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_latest_sequence_id` for non-panicking error handling.
    pub fn latest_sequence_id(&self) -> SequenceId {
        self.try_latest_sequence_id()
            .expect("Voice ring buffer lock is poisoned")
    }

    pub fn try_latest_sequence_id(&self) -> Result<SequenceId, VoiceError> {
        Ok(self.lock()?.latest)
    }

    /// Push a frame as the next sequence id, returning that id.
    ///
    /// Returns an error if the frame is too long or the lock is poisoned;
    /// the buffer is left untouched in both cases.
    pub fn try_enqueue(&self, frame: &[u8]) -> Result<SequenceId, VoiceError> {
        if frame.len() > self.max_frame_length {
            return Err(VoiceError::FrameTooLong {
                len: frame.len(),
                max: self.max_frame_length,
            });
        }
        let frame: Arc<[u8]> = Arc::from(frame);
        Ok(self.lock()?.push(frame))
    }

    /// Push a frame, silently refusing frames that are too long
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_enqueue` for non-panicking error handling.
    pub fn enqueue(&self, frame: &[u8]) -> Option<SequenceId> {
        match self.try_enqueue(frame) {
            Ok(sequence_id) => Some(sequence_id),
            Err(VoiceError::FrameTooLong { len, max }) => {
                trace!("dropping voice frame of {} bytes (max {})", len, max);
                None
            }
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_snapshot(&self) -> Result<VoiceSnapshot, VoiceError> {
        Ok(self.lock()?.snapshot())
    }

    /// Copy out the current frames
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_snapshot` for non-panicking error handling.
    pub fn snapshot(&self) -> VoiceSnapshot {
        self.try_snapshot()
            .expect("Voice ring buffer lock is poisoned")
    }

    /// Writes the outgoing voice message. Only the snapshot copy happens
    /// under the lock.
    pub fn try_write(&self, writer: &mut dyn BitWrite) -> Result<(), VoiceError> {
        let snapshot = self.try_snapshot()?;
        snapshot.write(writer);
        Ok(())
    }

    /// Writes the outgoing voice message
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_write` for non-panicking error handling.
    pub fn write(&self, writer: &mut dyn BitWrite) {
        self.try_write(writer)
            .expect("Voice ring buffer lock is poisoned")
    }

    /// Consumes one incoming voice message. All `K` frames are always read
    /// so the stream stays aligned; they replace the local slots only when
    /// the incoming id is newer than the local one. Returns whether the
    /// message was adopted.
    pub fn read(&self, reader: &mut BitReader) -> Result<bool, VoiceError> {
        let incoming = SequenceId::de(reader)?;
        let mut frames: VecDeque<Arc<[u8]>> = VecDeque::with_capacity(self.depth);
        for _ in 0..self.depth {
            let len = u8::de(reader)?;
            let bytes = reader.read_bytes(usize::from(len))?;
            frames.push_back(Arc::from(bytes));
        }

        let mut slots = self.lock()?;
        if !sequence_newer(incoming, slots.latest) {
            trace!(
                "discarding stale voice message {} (local latest {})",
                incoming,
                slots.latest
            );
            return Ok(false);
        }
        slots.latest = incoming;
        slots.frames = frames;
        Ok(true)
    }

    /// The frame stored for `sequence_id`, if it is still inside the window
    /// and has been filled
    pub fn frame(&self, sequence_id: SequenceId) -> Option<Arc<[u8]>> {
        self.lock().ok()?.frame(sequence_id)
    }

    /// Filled frames newer than `last_played`, oldest first
    pub fn frames_after(&self, last_played: SequenceId) -> Vec<(SequenceId, Arc<[u8]>)> {
        let Ok(slots) = self.lock() else {
            return Vec::new();
        };
        let depth = u16::try_from(slots.frames.len()).unwrap_or(u16::MAX);
        let oldest = slots.latest.wrapping_sub(depth.saturating_sub(1));
        (0..depth)
            .map(|offset| oldest.wrapping_add(offset))
            .filter(|sequence_id| sequence_newer(*sequence_id, last_played))
            .filter_map(|sequence_id| slots.frame(sequence_id).map(|frame| (sequence_id, frame)))
            .collect()
    }
}

impl Default for VoiceRingBuffer {
    fn default() -> Self {
        Self::new(VoiceConfig::default())
    }
}
