use limine::{LimineBootInfoRequest, LimineFramebufferRequest};

static BOOT_INFO_REQUEST: LimineBootInfoRequest = LimineBootInfoRequest::new(0);
static FRAMEBUFFER_REQUEST: LimineFramebufferRequest = LimineFramebufferRequest::new(0);

/// Longest bootloader name or version we are willing to scan for.
const MAX_BOOT_INFO_STR_LEN: usize = 100;

pub(crate) fn print_limine_boot_info() {
    let Some(boot_info) = BOOT_INFO_REQUEST.get_response().get() else {
        log::warn!("no limine boot info response");
        return;
    };

    let name = boot_info
        .name
        .as_ptr()
        .map_or("<unknown>", |ptr| unsafe {
            c_str_from_pointer(ptr.cast::<u8>(), MAX_BOOT_INFO_STR_LEN)
        });
    let version = boot_info
        .version
        .as_ptr()
        .map_or("<unknown>", |ptr| unsafe {
            c_str_from_pointer(ptr.cast::<u8>(), MAX_BOOT_INFO_STR_LEN)
        });
    log::info!("booted by {name} {version}");
}

/// The first framebuffer limine set up, if any.
pub(crate) fn limine_framebuffer() -> Option<&'static limine::LimineFramebuffer> {
    let response = FRAMEBUFFER_REQUEST.get_response().get()?;
    if response.framebuffer_count < 1 {
        return None;
    }

    let framebuffer = response.framebuffers().first()?;
    Some(unsafe { &*framebuffer.as_ptr() })
}

/// # Safety
///
/// If the string is not null-terminated, this will happily iterate through
/// memory until it finds a null byte, `max_size` bytes in, or a protection
/// fault.
unsafe fn c_str_from_pointer(ptr: *const u8, max_size: usize) -> &'static str {
    let mut len: usize = 0;
    while len < max_size {
        let c = *ptr.add(len);
        if c == 0 {
            break;
        }
        len += 1;
    }

    let slice = core::slice::from_raw_parts(ptr, len);
    core::str::from_utf8(slice).unwrap_or("<invalid utf8>")
}
