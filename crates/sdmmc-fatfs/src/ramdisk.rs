//! Block device held in memory, plus a tiny FAT16 image to put on it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_sdmmc::{Block, BlockCount, BlockDevice, BlockIdx};
use storage_test::ResultCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RamDiskError {
    OutOfRange,
    Unplugged,
}

impl From<RamDiskError> for ResultCode {
    fn from(err: RamDiskError) -> Self {
        match err {
            RamDiskError::OutOfRange => Self::InvalidParameter,
            RamDiskError::Unplugged => Self::NotReady,
        }
    }
}

/// Clones share the same blocks, so a test can hand one clone to a filesystem
/// and keep another to mount again later.
#[derive(Clone)]
pub(crate) struct RamDisk {
    blocks: Rc<RefCell<Vec<Block>>>,
    plugged_in: bool,
    reads: Rc<Cell<usize>>,
}

/// Partition start, right after the MBR.
const VOLUME_START: u32 = 1;
/// 4 MiB volume. With one block per cluster this leaves 8095 data clusters,
/// well inside the FAT16 range.
const VOLUME_BLOCKS: u32 = 8192;
const RESERVED_BLOCKS: u16 = 1;
const FAT_COUNT: u8 = 2;
const FAT_BLOCKS: u16 = 32;
const ROOT_ENTRIES: u16 = 512;

const PARTITION_TYPE_FAT16: u8 = 0x06;
const MEDIA_FIXED_DISK: u8 = 0xF8;

impl RamDisk {
    /// All zeroes: no partition table, no filesystem.
    pub(crate) fn blank(block_count: usize) -> Self {
        Self {
            blocks: Rc::new(RefCell::new((0..block_count).map(|_| Block::new()).collect())),
            plugged_in: true,
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// Fails every access with [`RamDiskError::Unplugged`].
    pub(crate) fn unplugged() -> Self {
        Self {
            plugged_in: false,
            ..Self::blank(0)
        }
    }

    /// An MBR with a single FAT16 partition holding a freshly formatted, empty
    /// volume.
    pub(crate) fn fat16() -> Self {
        let disk = Self::blank((VOLUME_START + VOLUME_BLOCKS) as usize);
        {
            let mut blocks = disk.blocks.borrow_mut();
            write_mbr(&mut blocks[0].contents);
            write_boot_sector(&mut blocks[VOLUME_START as usize].contents);

            let first_fat = (VOLUME_START + u32::from(RESERVED_BLOCKS)) as usize;
            for fat in 0..usize::from(FAT_COUNT) {
                let block = &mut blocks[first_fat + fat * usize::from(FAT_BLOCKS)];
                // Clusters 0 and 1 are reserved: media byte, then end of chain.
                block.contents[..4].copy_from_slice(&[MEDIA_FIXED_DISK, 0xFF, 0xFF, 0xFF]);
            }
        }
        disk
    }

    /// Number of `read` calls made so far, across every clone.
    pub(crate) fn reads(&self) -> usize {
        self.reads.get()
    }

    fn range(&self, start: BlockIdx, len: usize) -> Result<core::ops::Range<usize>, RamDiskError> {
        if !self.plugged_in {
            return Err(RamDiskError::Unplugged);
        }
        let first = start.0 as usize;
        let end = first.checked_add(len).ok_or(RamDiskError::OutOfRange)?;
        if end > self.blocks.borrow().len() {
            return Err(RamDiskError::OutOfRange);
        }
        Ok(first..end)
    }
}

impl BlockDevice for RamDisk {
    type Error = RamDiskError;

    fn read(
        &self,
        blocks: &mut [Block],
        start_block_idx: BlockIdx,
        _reason: &str,
    ) -> Result<(), RamDiskError> {
        self.reads.set(self.reads.get() + 1);
        let range = self.range(start_block_idx, blocks.len())?;
        let disk = self.blocks.borrow();
        for (dst, src) in blocks.iter_mut().zip(&disk[range]) {
            dst.contents = src.contents;
        }
        Ok(())
    }

    fn write(&self, blocks: &[Block], start_block_idx: BlockIdx) -> Result<(), RamDiskError> {
        let range = self.range(start_block_idx, blocks.len())?;
        let mut disk = self.blocks.borrow_mut();
        for (dst, src) in disk[range].iter_mut().zip(blocks) {
            dst.contents = src.contents;
        }
        Ok(())
    }

    fn num_blocks(&self) -> Result<BlockCount, RamDiskError> {
        Ok(BlockCount(self.blocks.borrow().len() as u32))
    }
}

fn write_signature(block: &mut [u8; Block::LEN]) {
    block[510] = 0x55;
    block[511] = 0xAA;
}

fn write_mbr(block: &mut [u8; Block::LEN]) {
    let entry = &mut block[446..462];
    entry[4] = PARTITION_TYPE_FAT16;
    entry[8..12].copy_from_slice(&VOLUME_START.to_le_bytes());
    entry[12..16].copy_from_slice(&VOLUME_BLOCKS.to_le_bytes());
    write_signature(block);
}

fn write_boot_sector(block: &mut [u8; Block::LEN]) {
    block[..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
    block[3..11].copy_from_slice(b"STORTEST");
    block[11..13].copy_from_slice(&(Block::LEN as u16).to_le_bytes());
    block[13] = 1; // blocks per cluster
    block[14..16].copy_from_slice(&RESERVED_BLOCKS.to_le_bytes());
    block[16] = FAT_COUNT;
    block[17..19].copy_from_slice(&ROOT_ENTRIES.to_le_bytes());
    block[19..21].copy_from_slice(&(VOLUME_BLOCKS as u16).to_le_bytes());
    block[21] = MEDIA_FIXED_DISK;
    block[22..24].copy_from_slice(&FAT_BLOCKS.to_le_bytes());
    block[24..26].copy_from_slice(&32_u16.to_le_bytes()); // blocks per track
    block[26..28].copy_from_slice(&2_u16.to_le_bytes()); // heads
    block[28..32].copy_from_slice(&VOLUME_START.to_le_bytes()); // hidden blocks
    block[36] = 0x80; // drive number
    block[38] = 0x29; // extended boot signature
    block[39..43].copy_from_slice(&0x1234_5678_u32.to_le_bytes());
    block[43..54].copy_from_slice(b"STORAGETEST");
    block[54..62].copy_from_slice(b"FAT16   ");
    write_signature(block);
}
