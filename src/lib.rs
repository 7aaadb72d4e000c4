//! Driver library for the control bus of the Sony ECX337A OLED microdisplay.
//!
//! The driver only programs control registers (power state, luminance and image orbit); pixel
//! data reaches the panel over its separate LVDS link and is not handled here.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate embedded_hal as hal;

#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod interface;
pub mod panel;
pub mod shared;

// Re-exports for primary API.
pub use command::{consts, Command, RegisterWord};
pub use config::Config;
pub use error::{BusFault, Error};
pub use interface::bitbang::BitBangInterface;
pub use interface::spi::SpiInterface;
pub use interface::{BitOrder, Line, Timing, Transport};
pub use panel::{Panel, PowerState, Settings};
pub use shared::SharedPanel;
