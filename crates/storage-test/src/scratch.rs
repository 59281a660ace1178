/// Fixed-capacity byte buffer for reading file contents back as text.
///
/// The last byte is reserved for a NUL terminator, so [`read_window`] is one
/// byte shorter than the capacity and the contents are always terminated
/// before they are looked at as text.
///
/// [`read_window`]: ScratchBuffer::read_window
#[derive(Debug)]
pub struct ScratchBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> ScratchBuffer<N> {
    const NONEMPTY: () = assert!(N > 0, "scratch buffer needs room for a terminator");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONEMPTY;
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.len = 0;
        self.bytes[0] = 0;
    }

    /// The part of the buffer a read may fill: everything but the terminator
    /// slot. Invalidates the previous contents.
    pub fn read_window(&mut self) -> &mut [u8] {
        self.clear();
        &mut self.bytes[..N - 1]
    }

    /// Records that `len` bytes of the read window are valid and terminates
    /// them. Counts past the window are clamped, and the clamped length is
    /// returned.
    pub fn terminate(&mut self, len: usize) -> usize {
        let len = len.min(N - 1);
        self.bytes[len] = 0;
        self.len = len;
        len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Contents up to the first NUL, as text. Invalid UTF-8 is cut at the
    /// first bad byte.
    pub fn as_text(&self) -> &str {
        let bytes = self.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let bytes = &bytes[..end];
        match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => core::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        }
    }
}

impl<const N: usize> Default for ScratchBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
