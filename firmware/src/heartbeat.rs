//! The liveness indicator: a small square in the corner of the framebuffer
//! that flips between lit and dark on every tick.

use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};

use storage_test::LivenessIndicator;

/// Side of the square, in pixels.
const SIZE: usize = 8;

const LIT: u32 = 0x00_20_C0_20;
const DARK: u32 = 0x00_00_00_00;

/// Until a framebuffer is attached, toggling only flips the state.
#[derive(Debug)]
pub(crate) struct Heartbeat {
    base: AtomicPtr<u32>,
    pitch_pixels: AtomicUsize,
    lit: AtomicBool,
}

pub(crate) static HEARTBEAT: Heartbeat = Heartbeat::new();

impl Heartbeat {
    const fn new() -> Self {
        Self {
            base: AtomicPtr::new(core::ptr::null_mut()),
            pitch_pixels: AtomicUsize::new(0),
            lit: AtomicBool::new(false),
        }
    }

    /// Draws on `framebuffer` from now on. Only 32 bit per pixel framebuffers
    /// big enough for the square are supported.
    pub(crate) fn attach(&self, framebuffer: &'static limine::LimineFramebuffer) {
        if framebuffer.bpp != 32 {
            log::warn!(
                "heartbeat needs a 32 bpp framebuffer, got {} bpp",
                framebuffer.bpp
            );
            return;
        }
        if framebuffer.width < SIZE as u64 || framebuffer.height < SIZE as u64 {
            log::warn!(
                "framebuffer {}x{} is too small for the heartbeat",
                framebuffer.width,
                framebuffer.height
            );
            return;
        }
        let Some(address) = framebuffer.address.as_ptr() else {
            log::warn!("limine framebuffer has no address");
            return;
        };

        // Publish the pitch before the pointer: the tick handler reads them
        // in the opposite order.
        self.pitch_pixels
            .store(framebuffer.pitch as usize / 4, Ordering::Release);
        self.base.store(address.cast::<u32>(), Ordering::Release);
        log::info!(
            "heartbeat on {}x{} framebuffer",
            framebuffer.width,
            framebuffer.height
        );
    }

    fn draw(&self, color: u32) {
        let base = self.base.load(Ordering::Acquire);
        if base.is_null() {
            return;
        }
        let pitch = self.pitch_pixels.load(Ordering::Acquire);

        for row in 0..SIZE {
            for col in 0..SIZE {
                // In bounds: `attach` checked the framebuffer holds the square.
                unsafe { base.add(row * pitch + col).write_volatile(color) };
            }
        }
    }
}

impl LivenessIndicator for Heartbeat {
    fn toggle(&self) {
        let lit = !self.lit.fetch_xor(true, Ordering::AcqRel);
        self.draw(if lit { LIT } else { DARK });
    }
}
