use bitflags::bitflags;

use crate::ResultCode;

/// Logical drive number of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeId(pub u8);

bitflags! {
    /// Access and disposition flags for [`FatFs::open`]. Values match the
    /// FatFs `FA_*` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        /// Create a new file, failing with `Exists` if it is already there.
        const CREATE_NEW = 0x04;
        /// Create a new file, truncating an existing one.
        const CREATE_ALWAYS = 0x08;
        /// Open the file if it exists, otherwise create it.
        const OPEN_ALWAYS = 0x10;
        /// Like `OPEN_ALWAYS`, positioned at the end of the file.
        const OPEN_APPEND = 0x30;
    }
}

/// The narrow filesystem contract the storage test drives. Implementations
/// wrap a real FAT driver (or a simulation in tests).
///
/// Volume state is owned by the implementation: `mount` registers the volume
/// and every later call uses it. Files are handed out by value from `open` and
/// consumed by `close`, so a closed handle cannot be used again.
///
/// An `Err` never carries [`ResultCode::Ok`].
pub trait FatFs {
    type File;

    fn mount(&mut self, volume: VolumeId) -> Result<(), ResultCode>;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File, ResultCode>;

    /// Writes `data` at the current position, returning how many bytes made
    /// it to the file.
    fn write(&mut self, file: &mut Self::File, data: &[u8]) -> Result<usize, ResultCode>;

    /// Reads at most `buf.len()` bytes, returning how many were read.
    fn read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, ResultCode>;

    fn close(&mut self, file: Self::File) -> Result<(), ResultCode>;
}
