use lazy_static::lazy_static;
use storage_test::{DiskTimers, TickService};
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

use crate::ata::DISK_TIMERS;
use crate::heartbeat::{Heartbeat, HEARTBEAT};
use crate::serial_println;

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt[InterruptIndex::Timer.into()].set_handler_fn(timer_interrupt_handler);

        idt
    };
}

/// Everything that runs on the 100 Hz tick. Nothing else touches the disk
/// timers' countdowns or the heartbeat from interrupt context.
static TICK: TickService<&DiskTimers, &Heartbeat> = TickService::new(&DISK_TIMERS, &HEARTBEAT);

// Set PIC offset to 32 b/c 0-31 are usually existing interrupts.
const PIC_1_OFFSET: u8 = 32;
const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

static PICS: spin::Mutex<pic8259::ChainedPics> =
    spin::Mutex::new(unsafe { pic8259::ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Only IRQ 0 (the PIT) is unmasked. The disk is polled, so IRQ 14 stays off.
const PIC_1_MASK: u8 = 0b1111_1110;
const PIC_2_MASK: u8 = 0b1111_1111;

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
enum InterruptIndex {
    Timer = PIC_1_OFFSET,
}

impl From<InterruptIndex> for u8 {
    fn from(index: InterruptIndex) -> Self {
        index as Self
    }
}

impl From<InterruptIndex> for usize {
    fn from(index: InterruptIndex) -> Self {
        index as Self
    }
}

/// Loads the IDT and remaps the PICs. Interrupts stay disabled until
/// [`enable`], so the PIT can be programmed in between.
pub(crate) fn init_idt() {
    IDT.load();

    unsafe {
        let mut pic = PICS.lock();
        pic.initialize();

        // Limine masks all legacy PIC IRQs. We have to enable the ones we
        // want.
        pic.write_masks(PIC_1_MASK, PIC_2_MASK);
    };
}

/// Starts the tick.
pub(crate) fn enable() {
    x86_64::instructions::interrupts::enable();
    log::debug!("Interrupts enabled");
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    serial_println!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    serial_println!("EXCEPTION: PAGE FAULT");
    serial_println!("Accessed Address: {:?}", Cr2::read());
    serial_println!("Error Code: {:?}", error_code);
    serial_println!("{:#?}", stack_frame);

    crate::hlt_loop()
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    serial_println!(
        "EXCEPTION: GENERAL PROTECTION FAULT\nerror_code:{}\n{:#?}",
        error_code,
        stack_frame
    );
    crate::hlt_loop()
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    TICK.on_tick();

    unsafe {
        PICS.lock()
            .notify_end_of_interrupt(InterruptIndex::Timer.into());
    }
}
