//! [`DisplayApi`] on top of the `winuser.h`/`wingdi.h` calls exposed by `winsafe`.

use log::{debug, warn};
use winsafe::{co, prelude::*, EnumDisplayDevices, GmidxEnum, DEVMODE, DISPLAY_DEVICE, HWND};

use crate::platform::{DisplayApi, PlatformError, PlatformResult};
use crate::{
    DisplayChangeResult, DisplayDevice, DisplayMode, DisplaySettings, DisplayStateFlags, Dpi,
    InvalidOrientation, ModeChange, Orientation, Position, RefreshRate, Resolution,
};

/// The live Windows display configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Display;

impl DisplayDevice {
    /// Create a display device from a winsafe display
    pub(crate) fn from_winsafe(device: &DISPLAY_DEVICE) -> DisplayDevice {
        DisplayDevice {
            name: device.DeviceName(),
            string: device.DeviceString(),
            id: device.DeviceID(),
            key: device.DeviceKey(),
            state_flags: DisplayStateFlags::from_bits_retain(u32::from(device.StateFlags)),
        }
    }
}

impl DisplayMode {
    /// Reads the mode fields of a `winsafe::DEVMODE`
    pub(crate) fn from_winsafe(devmode: &DEVMODE) -> DisplayMode {
        DisplayMode::new(
            Resolution::new(devmode.dmPelsWidth, devmode.dmPelsHeight),
            RefreshRate(devmode.dmDisplayFrequency),
            devmode.dmBitsPerPel,
        )
    }
}

impl DisplaySettings {
    pub(crate) fn from_winsafe(devmode: &DEVMODE) -> PlatformResult<DisplaySettings> {
        let raw_orientation = u32::from(devmode.dmDisplayOrientation());
        let orientation = Orientation::try_from(raw_orientation)
            .map_err(|InvalidOrientation(raw)| PlatformError::InvalidOrientation(raw))?;
        let point = devmode.dmPosition();

        Ok(DisplaySettings {
            mode: DisplayMode::from_winsafe(devmode),
            orientation,
            position: Position::new(point.x, point.y),
        })
    }
}

/// Fetch the current `DEVMODE` of a display, the primary one for `None`
fn fetch_current(device: Option<&str>) -> PlatformResult<DEVMODE> {
    let mut devmode = DEVMODE::default();
    winsafe::EnumDisplaySettings(
        device,
        GmidxEnum::Enum(co::ENUM_SETTINGS::CURRENT),
        &mut devmode,
    )?;
    Ok(devmode)
}

impl DisplayApi for Win32Display {
    fn enumerate_devices(&self) -> PlatformResult<Vec<DisplayDevice>> {
        let devices = EnumDisplayDevices(None, None)
            .map(|device| device.map(DisplayDevice::from_winsafe))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("EnumDisplayDevices returned {} device(s)", devices.len());
        Ok(devices)
    }

    fn current_settings(&self, device: Option<&str>) -> PlatformResult<DisplaySettings> {
        debug!("Reading current settings of {}", device.unwrap_or("the primary display"));
        let devmode = fetch_current(device)?;
        DisplaySettings::from_winsafe(&devmode)
    }

    fn enumerate_modes(&self, device: &str) -> PlatformResult<Vec<DisplayMode>> {
        let mut modes = Vec::new();
        let mut devmode = DEVMODE::default();
        // The mode list ends at the first index the driver rejects
        while winsafe::EnumDisplaySettings(
            Some(device),
            GmidxEnum::Gmidx(modes.len() as u32),
            &mut devmode,
        )
        .is_ok()
        {
            modes.push(DisplayMode::from_winsafe(&devmode));
        }
        debug!("{} reports {} mode(s)", device, modes.len());
        Ok(modes)
    }

    fn change_mode(&self, device: Option<&str>, change: &ModeChange) -> DisplayChangeResult {
        let mut devmode = match fetch_current(device) {
            Ok(devmode) => devmode,
            Err(err) => {
                warn!("Could not read current settings before the change: {}", err);
                return DisplayChangeResult::Failed;
            }
        };

        devmode.dmPelsWidth = change.resolution.width;
        devmode.dmPelsHeight = change.resolution.height;
        devmode.dmFields = co::DM::PELSWIDTH | co::DM::PELSHEIGHT;
        if !change.refresh_rate.is_unspecified() {
            devmode.dmDisplayFrequency = change.refresh_rate.0;
            devmode.dmFields |= co::DM::DISPLAYFREQUENCY;
        }

        let flags = if change.persist {
            co::CDS::UPDATEREGISTRY
        } else {
            co::CDS::DYNAMICALLY
        };

        debug!(
            "ChangeDisplaySettingsEx({:?}, {} @ {}, persist: {})",
            device, change.resolution, change.refresh_rate, change.persist
        );
        let native = match winsafe::ChangeDisplaySettingsEx(device, Some(&mut devmode), flags) {
            Ok(code) | Err(code) => i32::from(code),
        };

        DisplayChangeResult::from_native(native).unwrap_or_else(|| {
            warn!("Unknown DISP_CHANGE code {}", native);
            DisplayChangeResult::Failed
        })
    }

    fn query_dpi(&self) -> PlatformResult<Dpi> {
        let hdc = HWND::NULL
            .GetDC()
            .map_err(|_| PlatformError::NoDeviceContext)?;
        let x = hdc.GetDeviceCaps(co::GDC::LOGPIXELSX);
        let y = hdc.GetDeviceCaps(co::GDC::LOGPIXELSY);

        Ok(Dpi {
            x: x.max(0) as u32,
            y: y.max(0) as u32,
        })
    }
}
