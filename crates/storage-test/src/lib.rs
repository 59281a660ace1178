//! Pure code for the storage test: drives a FAT filesystem through a mount,
//! write, read-back cycle and reports every outcome on a text console. Used in
//! our firmware.
//!
//! Nothing in here touches hardware. The filesystem sits behind [`FatFs`], the
//! timer interrupt behind [`TickService`], and the console is any
//! [`core::fmt::Write`].
//!
//! # Resources
//!
//! - <http://elm-chan.org/fsw/ff/doc/rc.html> (FatFs return codes)
//! - <http://elm-chan.org/fsw/ff/doc/open.html> (FatFs open mode flags)

#![cfg_attr(not(test), no_std)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cargo_common_metadata,
    clippy::doc_markdown,
    clippy::implicit_return,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::redundant_pub_crate,
    clippy::wildcard_imports
)]

mod config;
mod console;
mod disk_timer;
mod fs;
mod result;
mod scratch;
mod sequencer;
mod tick;

#[cfg(test)]
mod sim;

pub use config::*;
pub use console::*;
pub use disk_timer::*;
pub use fs::*;
pub use result::*;
pub use scratch::*;
pub use sequencer::*;
pub use tick::*;
