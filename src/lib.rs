//! A library to list monitors and change their resolution through the Windows API.
//!
//! [`DisplayControl`] wraps the `winuser.h` display calls behind the [`platform::DisplayApi`]
//! trait. On Windows, [`DisplayControl::system`] talks to the live display configuration;
//! elsewhere it reports no monitors and fails every query.

mod change;
mod display;
pub mod platform;
mod types;
#[cfg(windows)]
mod win32;

pub use change::*;
pub use display::*;
pub use types::*;
#[cfg(windows)]
pub use win32::Win32Display;

/// The [`platform::DisplayApi`] backing [`DisplayControl::system`]
#[cfg(windows)]
pub type SystemDisplay = Win32Display;
#[cfg(not(windows))]
pub type SystemDisplay = platform::UnsupportedDisplay;
