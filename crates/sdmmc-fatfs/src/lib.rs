//! Runs the storage test's [`FatFs`] contract on top of the `embedded-sdmmc`
//! FAT driver. Used in our firmware, with whatever block device the board has.
//!
//! # Resources
//!
//! - <https://docs.rs/embedded-sdmmc>
//! - <https://wiki.osdev.org/FAT>
//!
//! [`FatFs`]: storage_test::FatFs

#![cfg_attr(not(test), no_std)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::cargo_common_metadata,
    clippy::implicit_return,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::wildcard_imports
)]

mod backend;
mod clock;
mod error;
mod mode;

#[cfg(test)]
mod ramdisk;

pub use backend::*;
pub use clock::*;
pub use error::*;
pub use mode::*;
