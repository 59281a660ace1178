//! Polled ATA PIO driver for the primary master drive, the board's stand-in
//! for the SD card slot. Waits on the device are bounded by the disk timers
//! the tick interrupt counts down, so a missing or wedged drive turns into an
//! error instead of a hang.
//!
//! See <https://wiki.osdev.org/ATA_PIO_Mode>.

use core::fmt;

use bitflags::bitflags;
use embedded_sdmmc::{Block, BlockCount, BlockDevice, BlockIdx};
use spin::{Mutex, Once};
use storage_test::{DiskTimer, DiskTimers, ResultCode};
use x86_64::instructions::port::{Port, PortReadOnly, PortWriteOnly};

/// Countdowns for the driver's waits. Ticked by the timer interrupt.
pub(crate) static DISK_TIMERS: DiskTimers = DiskTimers::new();

const PRIMARY_IO_BASE: u16 = 0x1F0;
const PRIMARY_CONTROL_BASE: u16 = 0x3F6;

/// Drive select value for the master drive with LBA addressing. The low
/// nibble carries LBA bits 24..28.
const MASTER_LBA: u8 = 0xE0;

/// Sets nIEN so the drive never raises IRQ 14.
const DEVICE_CONTROL_NO_IRQ: u8 = 1 << 1;

/// Highest block count addressable with 28 bit LBA.
const LBA28_BLOCKS: u32 = 1 << 28;

const WORDS_PER_BLOCK: usize = Block::LEN / 2;

/// How long the drive may stay busy before we give up on it.
const BUSY_TIMEOUT_MS: u32 = 500;

/// How long a command may take to produce or accept a block of data.
const TRANSFER_TIMEOUT_MS: u32 = 1000;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Status: u8 {
        const ERROR = 1 << 0;
        const DATA_REQUEST = 1 << 3;
        const DRIVE_FAULT = 1 << 5;
        const READY = 1 << 6;
        const BUSY = 1 << 7;
    }
}

bitflags! {
    /// Contents of the error register after a command fails.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct DeviceError: u8 {
        const ADDRESS_MARK_NOT_FOUND = 1 << 0;
        const TRACK_ZERO_NOT_FOUND = 1 << 1;
        const ABORTED_COMMAND = 1 << 2;
        const MEDIA_CHANGE_REQUEST = 1 << 3;
        const ID_NOT_FOUND = 1 << 4;
        const MEDIA_CHANGED = 1 << 5;
        const UNCORRECTABLE_DATA = 1 << 6;
        const BAD_BLOCK = 1 << 7;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Command {
    ReadSectors = 0x20,
    WriteSectors = 0x30,
    FlushCache = 0xE7,
    Identify = 0xEC,
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtaError {
    /// Nothing answered on the bus, or what answered is not an ATA disk.
    NoDevice,
    /// The drive never got out of the way in time.
    Timeout,
    /// The drive reported a fault.
    DriveFault,
    /// A command failed. Carries the error register.
    Device(DeviceError),
    /// The request reaches past the last block.
    OutOfRange,
}

impl fmt::Display for AtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => write!(f, "no ATA drive present"),
            Self::Timeout => write!(f, "timed out waiting on the drive"),
            Self::DriveFault => write!(f, "drive fault"),
            Self::Device(error) => write!(f, "command failed: {error:?}"),
            Self::OutOfRange => write!(f, "block out of range"),
        }
    }
}

impl From<AtaError> for ResultCode {
    fn from(error: AtaError) -> Self {
        match error {
            AtaError::NoDevice | AtaError::Timeout => Self::NotReady,
            AtaError::DriveFault | AtaError::Device(_) => Self::DiskError,
            AtaError::OutOfRange => Self::InvalidParameter,
        }
    }
}

/// The task file registers of one ATA channel.
struct Channel {
    data: Port<u16>,
    error: PortReadOnly<u8>,
    sector_count: Port<u8>,
    lba_lo: Port<u8>,
    lba_mid: Port<u8>,
    lba_hi: Port<u8>,
    drive_select: Port<u8>,
    status: PortReadOnly<u8>,
    command: PortWriteOnly<u8>,
    alternate_status: PortReadOnly<u8>,
    device_control: PortWriteOnly<u8>,
}

impl Channel {
    fn new(io_base: u16, control_base: u16) -> Self {
        Self {
            data: Port::new(io_base),
            error: PortReadOnly::new(io_base + 1),
            sector_count: Port::new(io_base + 2),
            lba_lo: Port::new(io_base + 3),
            lba_mid: Port::new(io_base + 4),
            lba_hi: Port::new(io_base + 5),
            drive_select: Port::new(io_base + 6),
            status: PortReadOnly::new(io_base + 7),
            command: PortWriteOnly::new(io_base + 7),
            alternate_status: PortReadOnly::new(control_base),
            device_control: PortWriteOnly::new(control_base),
        }
    }

    fn status(&mut self) -> Status {
        unsafe { Status::from_bits_retain(self.status.read()) }
    }

    fn error(&mut self) -> DeviceError {
        unsafe { DeviceError::from_bits_retain(self.error.read()) }
    }

    /// Gives the drive the 400ns it needs to post a valid status after a
    /// command or drive select.
    fn settle(&mut self) {
        for _ in 0..4 {
            let _ = unsafe { self.alternate_status.read() };
        }
    }

    fn wait_not_busy(&mut self, timer: &DiskTimer) -> Result<(), AtaError> {
        timer
            .wait_until(BUSY_TIMEOUT_MS, || !self.status().contains(Status::BUSY))
            .map_err(|_| AtaError::Timeout)
    }

    /// Waits for the drive to ask for (or offer) a block of data.
    fn wait_data_request(&mut self, timer: &DiskTimer) -> Result<(), AtaError> {
        self.settle();

        let mut status = Status::empty();
        timer
            .wait_until(TRANSFER_TIMEOUT_MS, || {
                status = self.status();
                !status.contains(Status::BUSY)
                    && status.intersects(
                        Status::DATA_REQUEST | Status::ERROR | Status::DRIVE_FAULT,
                    )
            })
            .map_err(|_| AtaError::Timeout)?;

        if status.contains(Status::ERROR) {
            return Err(AtaError::Device(self.error()));
        }
        if status.contains(Status::DRIVE_FAULT) {
            return Err(AtaError::DriveFault);
        }
        Ok(())
    }

    fn write_command(&mut self, command: Command) {
        unsafe { self.command.write(command.into()) };
    }

    fn select_lba(&mut self, lba: u32) {
        let [lo, mid, hi, top] = lba.to_le_bytes();
        unsafe {
            self.drive_select.write(MASTER_LBA | (top & 0x0F));
            self.sector_count.write(1);
            self.lba_lo.write(lo);
            self.lba_mid.write(mid);
            self.lba_hi.write(hi);
        }
    }

    /// Runs IDENTIFY DEVICE and returns the drive's 28 bit LBA block count.
    fn identify(&mut self, timers: &DiskTimers) -> Result<u32, AtaError> {
        unsafe {
            self.device_control.write(DEVICE_CONTROL_NO_IRQ);
            self.drive_select.write(MASTER_LBA);
        }
        self.settle();

        // A floating bus reads as all ones.
        if self.status().bits() == 0xFF {
            return Err(AtaError::NoDevice);
        }

        unsafe {
            self.sector_count.write(0);
            self.lba_lo.write(0);
            self.lba_mid.write(0);
            self.lba_hi.write(0);
        }
        self.write_command(Command::Identify);
        self.settle();
        if self.status().is_empty() {
            return Err(AtaError::NoDevice);
        }

        self.wait_not_busy(&timers.busy)?;
        // ATAPI and SATA devices leave a signature here instead of data.
        let signature = unsafe { (self.lba_mid.read(), self.lba_hi.read()) };
        if signature != (0, 0) {
            return Err(AtaError::NoDevice);
        }
        self.wait_data_request(&timers.transfer)?;

        let mut identify = [0_u16; WORDS_PER_BLOCK];
        for word in &mut identify {
            *word = unsafe { self.data.read() };
        }

        Ok(u32::from(identify[60]) | (u32::from(identify[61]) << 16))
    }

    fn read_block(
        &mut self,
        timers: &DiskTimers,
        lba: u32,
        block: &mut Block,
    ) -> Result<(), AtaError> {
        self.wait_not_busy(&timers.busy)?;
        self.select_lba(lba);
        self.write_command(Command::ReadSectors);
        self.wait_data_request(&timers.transfer)?;

        for bytes in block.contents.chunks_exact_mut(2) {
            let word = unsafe { self.data.read() };
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        Ok(())
    }

    fn write_block(
        &mut self,
        timers: &DiskTimers,
        lba: u32,
        block: &Block,
    ) -> Result<(), AtaError> {
        self.wait_not_busy(&timers.busy)?;
        self.select_lba(lba);
        self.write_command(Command::WriteSectors);
        self.wait_data_request(&timers.transfer)?;

        for bytes in block.contents.chunks_exact(2) {
            let word = u16::from_le_bytes([bytes[0], bytes[1]]);
            unsafe { self.data.write(word) };
        }
        Ok(())
    }

    fn flush(&mut self, timers: &DiskTimers) -> Result<(), AtaError> {
        self.wait_not_busy(&timers.busy)?;
        unsafe { self.drive_select.write(MASTER_LBA) };
        self.write_command(Command::FlushCache);
        self.settle();
        self.wait_not_busy(&timers.busy)?;

        let status = self.status();
        if status.contains(Status::ERROR) {
            return Err(AtaError::Device(self.error()));
        }
        Ok(())
    }
}

/// The primary master drive as an [`embedded_sdmmc`] block device.
pub(crate) struct AtaDisk {
    channel: Mutex<Channel>,
    timers: &'static DiskTimers,
    block_count: Once<Result<u32, AtaError>>,
}

impl AtaDisk {
    /// The drive isn't touched until the first block request.
    pub(crate) fn primary_master(timers: &'static DiskTimers) -> Self {
        Self {
            channel: Mutex::new(Channel::new(PRIMARY_IO_BASE, PRIMARY_CONTROL_BASE)),
            timers,
            block_count: Once::new(),
        }
    }

    fn block_count(&self) -> Result<u32, AtaError> {
        *self.block_count.call_once(|| {
            let block_count = self
                .channel
                .lock()
                .identify(self.timers)
                .map(|count| count.min(LBA28_BLOCKS));
            match block_count {
                Ok(count) => log::info!("ATA primary master: {count} blocks"),
                Err(error) => log::warn!("ATA primary master: {error}"),
            }
            block_count
        })
    }

    /// First LBA of a request for `len` blocks at `start`, if the request
    /// fits on the drive.
    fn checked_range(&self, start: BlockIdx, len: usize) -> Result<u32, AtaError> {
        let block_count = self.block_count()?;
        let len = u32::try_from(len).map_err(|_| AtaError::OutOfRange)?;
        match start.0.checked_add(len) {
            Some(end) if end <= block_count => Ok(start.0),
            _ => Err(AtaError::OutOfRange),
        }
    }
}

impl fmt::Debug for AtaDisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtaDisk")
            .field("io_base", &format_args!("{PRIMARY_IO_BASE:#X}"))
            .field("block_count", &self.block_count.get())
            .finish_non_exhaustive()
    }
}

impl BlockDevice for AtaDisk {
    type Error = AtaError;

    fn read(
        &self,
        blocks: &mut [Block],
        start_block_idx: BlockIdx,
        _reason: &str,
    ) -> Result<(), Self::Error> {
        let first = self.checked_range(start_block_idx, blocks.len())?;
        let mut channel = self.channel.lock();
        for (lba, block) in (first..).zip(blocks.iter_mut()) {
            channel.read_block(self.timers, lba, block)?;
        }
        Ok(())
    }

    fn write(&self, blocks: &[Block], start_block_idx: BlockIdx) -> Result<(), Self::Error> {
        let first = self.checked_range(start_block_idx, blocks.len())?;
        let mut channel = self.channel.lock();
        for (lba, block) in (first..).zip(blocks.iter()) {
            channel.write_block(self.timers, lba, block)?;
        }
        channel.flush(self.timers)
    }

    fn num_blocks(&self) -> Result<BlockCount, Self::Error> {
        self.block_count().map(BlockCount)
    }
}
