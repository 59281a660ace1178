//! SD card test firmware for a QEMU x86_64 board booted by limine.
//!
//! Brings up the serial console and the 100 Hz tick, then runs the storage
//! test once against the FAT volume on the primary ATA drive and idles. Under
//! QEMU the exit code says whether every step succeeded.

#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::cargo_common_metadata,
    clippy::doc_markdown,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::cast_possible_truncation,
    clippy::redundant_pub_crate
)]

mod ansiterm;
mod ata;
mod boot_info;
mod heartbeat;
mod interrupts;
mod logging;
mod pit;
mod qemu;
mod serial;

use core::fmt::Write;

use sdmmc_fatfs::{FixedTimeSource, SdmmcFatFs};
use storage_test::{SequenceConfig, Sequencer, SCRATCH_CAPACITY, TICK_HZ};

use crate::qemu::QEMUExitCode;

#[no_mangle]
extern "C" fn _start() -> ! {
    serial::init();
    logging::init();
    boot_info::print_limine_boot_info();

    match boot_info::limine_framebuffer() {
        Some(framebuffer) => heartbeat::HEARTBEAT.attach(framebuffer),
        None => log::warn!("no limine framebuffer, heartbeat disabled"),
    }

    interrupts::init_idt();
    pit::init(TICK_HZ);
    interrupts::enable();

    let mut console = serial::Console;
    // N.B. If the console is broken there is nobody to tell, but the exit
    // code below still reports the result.
    let _ = console.write_str("\n\nSD Card Test Program\n");

    let disk = ata::AtaDisk::primary_master(&ata::DISK_TIMERS);
    let fs = SdmmcFatFs::new(disk, FixedTimeSource::DEFAULT);
    let mut sequencer = Sequencer::<_, SCRATCH_CAPACITY>::new(fs, SequenceConfig::DEFAULT);

    let exit_code = match sequencer.run(&mut console) {
        Ok(report) if report.all_ok() => QEMUExitCode::Success,
        Ok(_) => QEMUExitCode::Failed,
        Err(_) => {
            log::error!("serial console failed during the storage test");
            QEMUExitCode::Failed
        }
    };
    qemu::exit_qemu(exit_code);

    // Keep ticking so the heartbeat shows we're still alive.
    hlt_loop()
}

#[panic_handler]
fn rust_panic(info: &core::panic::PanicInfo) -> ! {
    // Whoever held the serial port isn't getting it back.
    unsafe { serial::force_unlock() };
    log::error!("PANIC: {info}");
    hlt_loop()
}

pub(crate) fn hlt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}
