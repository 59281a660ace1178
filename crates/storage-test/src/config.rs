use crate::VolumeId;

/// Capacity of the scratch buffer used for read-back, including the
/// terminator byte.
pub const SCRATCH_CAPACITY: usize = 80;

/// What the storage test writes and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceConfig {
    pub volume: VolumeId,
    pub file_name: &'static str,
    /// Must be text and shorter than the scratch buffer the sequencer reads it
    /// back into, or the read-back is cut short.
    pub payload: &'static [u8],
}

impl SequenceConfig {
    pub const DEFAULT: Self = Self {
        volume: VolumeId(0),
        file_name: "newFile1",
        payload: b"This is a test\r\n",
    };
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const _: () = assert!(
    SequenceConfig::DEFAULT.payload.len() < SCRATCH_CAPACITY,
    "payload plus terminator must fit in the scratch buffer"
);
