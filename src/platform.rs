//! The OS capabilities the facade is built on.

use thiserror::Error;

use crate::{DisplayChangeResult, DisplayDevice, DisplayMode, DisplaySettings, Dpi, ModeChange};

/// Error type for queries against the display platform
#[derive(Error, Debug)]
pub enum PlatformError {
    #[cfg(windows)]
    #[error("Error when calling the Windows API")]
    WinAPI(#[from] winsafe::co::ERROR),
    #[error("Display {0} has no settings")]
    NoSettings(String),
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(u32),
    #[error("Failed to get the screen device context")]
    NoDeviceContext,
    #[error("Display APIs are not supported on this platform")]
    Unsupported,
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Live access to the OS display configuration.
///
/// Every call goes to the OS; implementations must not cache.
/// `device` of `None` addresses the primary display.
pub trait DisplayApi {
    /// All display devices in OS enumeration order
    fn enumerate_devices(&self) -> PlatformResult<Vec<DisplayDevice>>;

    /// The mode the device is currently running
    fn current_settings(&self, device: Option<&str>) -> PlatformResult<DisplaySettings>;

    /// Every mode the driver reports for the device, in driver order
    fn enumerate_modes(&self, device: &str) -> PlatformResult<Vec<DisplayMode>>;

    /// Asks the OS to apply `change`, synchronously
    fn change_mode(&self, device: Option<&str>, change: &ModeChange) -> DisplayChangeResult;

    fn query_dpi(&self) -> PlatformResult<Dpi>;
}

impl<T: DisplayApi + ?Sized> DisplayApi for &T {
    fn enumerate_devices(&self) -> PlatformResult<Vec<DisplayDevice>> {
        (**self).enumerate_devices()
    }

    fn current_settings(&self, device: Option<&str>) -> PlatformResult<DisplaySettings> {
        (**self).current_settings(device)
    }

    fn enumerate_modes(&self, device: &str) -> PlatformResult<Vec<DisplayMode>> {
        (**self).enumerate_modes(device)
    }

    fn change_mode(&self, device: Option<&str>, change: &ModeChange) -> DisplayChangeResult {
        (**self).change_mode(device, change)
    }

    fn query_dpi(&self) -> PlatformResult<Dpi> {
        (**self).query_dpi()
    }
}

/// Backend for targets without display APIs: no devices, every query fails
#[cfg(not(windows))]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDisplay;

#[cfg(not(windows))]
impl DisplayApi for UnsupportedDisplay {
    fn enumerate_devices(&self) -> PlatformResult<Vec<DisplayDevice>> {
        Err(PlatformError::Unsupported)
    }

    fn current_settings(&self, _device: Option<&str>) -> PlatformResult<DisplaySettings> {
        Err(PlatformError::Unsupported)
    }

    fn enumerate_modes(&self, _device: &str) -> PlatformResult<Vec<DisplayMode>> {
        Err(PlatformError::Unsupported)
    }

    fn change_mode(&self, _device: Option<&str>, _change: &ModeChange) -> DisplayChangeResult {
        DisplayChangeResult::Failed
    }

    fn query_dpi(&self) -> PlatformResult<Dpi> {
        Err(PlatformError::Unsupported)
    }
}
