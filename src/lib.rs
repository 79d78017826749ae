//! A CHIP-8 virtual machine with an optional SUPER-CHIP 1.1 instruction set.
//!
//! The library holds no window, audio or clock: the host loads a ROM, calls
//! [`Emulator::step`] at its chosen instruction rate, [`Emulator::tick_60hz`]
//! sixty times a second, and reads the framebuffer back out.

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timer;

pub use config::{Config, Quirks, Variant};
pub use decode::OpCodes;
pub use display::FrameBuffer;
pub use emulator::{Emulator, Halt, VmState};
pub use error::{ExecError, LoadError};
