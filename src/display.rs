use std::collections::HashSet;

use log::{debug, info, warn};
use thiserror::Error;

use crate::platform::{DisplayApi, PlatformError};
use crate::{
    ChangeOutcome, DisplayChangeResult, DisplayMode, Dpi, ModeRequest, Monitor, Resolution,
    SystemDisplay,
};

/// Error type for the display module
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Monitor {0} not found")]
    NotFound(String),
    #[error("Invalid dimensions {0}: width and height must be greater than zero")]
    InvalidDimensions(Resolution),
    #[error("No monitors are attached to the desktop")]
    NoMonitors,
    #[error("Error when querying the display platform")]
    Platform(#[from] PlatformError),
}

pub type DisplayResult<T = ()> = std::result::Result<T, DisplayError>;

/// Lists monitors and changes their modes.
///
/// Nothing is cached: every call re-queries the OS through `A`. Monitor ids
/// are the OS device names and may change between enumerations, so look them
/// up again after a hot-plug or driver change.
#[derive(Debug, Default, Clone)]
pub struct DisplayControl<A> {
    api: A,
}

impl DisplayControl<SystemDisplay> {
    /// A facade over the live display configuration of this machine
    pub fn system() -> Self {
        Self::new(SystemDisplay::default())
    }
}

impl<A: DisplayApi> DisplayControl<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns every monitor attached to the desktop, in OS enumeration order.
    ///
    /// An enumeration failure yields an empty list. A monitor whose settings
    /// cannot be read is listed without `current_settings`.
    pub fn list_monitors(&self) -> Vec<Monitor> {
        let devices = match self.api.enumerate_devices() {
            Ok(devices) => devices,
            Err(err) => {
                warn!("Display enumeration failed, reporting no monitors: {}", err);
                return Vec::new();
            }
        };

        devices
            .into_iter()
            .filter(|device| device.is_attached())
            .map(|device| {
                let settings = match self.api.current_settings(Some(&device.name)) {
                    Ok(settings) => Some(settings),
                    Err(err) => {
                        warn!("Could not read settings of {}: {}", device.name, err);
                        None
                    }
                };
                Monitor::new(device, settings)
            })
            .collect()
    }

    /// Current mode of the OS primary display
    pub fn screen_resolution(&self) -> DisplayResult<DisplayMode> {
        Ok(self.api.current_settings(None)?.mode)
    }

    /// Current mode of the monitor `id`
    pub fn monitor_resolution(&self, id: &str) -> DisplayResult<DisplayMode> {
        self.ensure_monitor(id)?;
        Ok(self.api.current_settings(Some(id))?.mode)
    }

    /// All modes the driver supports for the monitor `id`, in driver order.
    ///
    /// Exact duplicates are dropped; modes differing only by refresh rate or
    /// bit depth are kept.
    pub fn available_resolutions(&self, id: &str) -> DisplayResult<Vec<DisplayMode>> {
        self.ensure_monitor(id)?;
        let mut seen = HashSet::new();
        let modes: Vec<DisplayMode> = self
            .api
            .enumerate_modes(id)?
            .into_iter()
            .filter(|mode| seen.insert(*mode))
            .collect();
        Ok(modes)
    }

    /// Applies `request` to the monitor `id` with a single platform call.
    ///
    /// The outcome is not verified afterwards; read the mode back with
    /// [`DisplayControl::monitor_resolution`] if that matters.
    pub fn set_monitor_resolution(
        &self,
        id: &str,
        request: &ModeRequest,
    ) -> DisplayResult<ChangeOutcome> {
        Self::check_dimensions(request)?;
        self.ensure_monitor(id)?;
        self.apply(id, request)
    }

    /// Applies `request` to every attached monitor, one after the other.
    ///
    /// A failure does not stop the remaining monitors and nothing is rolled
    /// back. The first failure is returned, prefixed with its monitor id.
    pub fn set_all_screen_resolutions(
        &self,
        request: &ModeRequest,
    ) -> DisplayResult<ChangeOutcome> {
        Self::check_dimensions(request)?;
        let monitors = self.list_monitors();
        if monitors.is_empty() {
            return Err(DisplayError::NoMonitors);
        }

        let mut first_failure: Option<ChangeOutcome> = None;
        for monitor in &monitors {
            let outcome = match self.apply(&monitor.id, request) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!("{}: {}", monitor.id, err);
                    ChangeOutcome::new(DisplayChangeResult::Failed, err.to_string())
                }
            };
            if !outcome.is_success() && first_failure.is_none() {
                first_failure = Some(ChangeOutcome::new(
                    outcome.code,
                    format!("{}: {}", monitor.id, outcome.message),
                ));
            }
        }

        Ok(first_failure.unwrap_or_else(ChangeOutcome::success))
    }

    /// Current system DPI
    pub fn system_dpi(&self) -> DisplayResult<Dpi> {
        Ok(self.api.query_dpi()?)
    }

    fn check_dimensions(request: &ModeRequest) -> DisplayResult {
        if !request.resolution.is_valid() {
            return Err(DisplayError::InvalidDimensions(request.resolution));
        }
        Ok(())
    }

    fn ensure_monitor(&self, id: &str) -> DisplayResult {
        let known = self
            .api
            .enumerate_devices()?
            .iter()
            .any(|device| device.is_attached() && device.name == id);
        if known {
            Ok(())
        } else {
            Err(DisplayError::NotFound(id.to_string()))
        }
    }

    fn apply(&self, id: &str, request: &ModeRequest) -> DisplayResult<ChangeOutcome> {
        if request.validate {
            if let Some(rejected) = self.validate_mode(id, request)? {
                warn!("{}: {}", id, rejected.message);
                return Ok(rejected);
            }
        }

        let code = self.api.change_mode(Some(id), &request.to_change());
        if code.is_success() {
            info!("{} switched to {} @ {}", id, request.resolution, request.refresh_rate);
        } else {
            warn!("{} rejected {}: {}", id, request.resolution, code);
        }
        Ok(code.into())
    }

    /// Checks the request against the driver's mode list, `Some` if it cannot work
    fn validate_mode(
        &self,
        id: &str,
        request: &ModeRequest,
    ) -> DisplayResult<Option<ChangeOutcome>> {
        let target = request.resolution;
        let mut rates: Vec<u32> = self
            .api
            .enumerate_modes(id)?
            .iter()
            .filter(|mode| mode.resolution == target)
            .map(|mode| mode.refresh_rate.0)
            .collect();
        debug!("{} supports {} at {:?} Hz", id, target, rates);

        if rates.is_empty() {
            return Ok(Some(ChangeOutcome::new(
                DisplayChangeResult::BadMode,
                format!(
                    "The requested resolution is not supported. Width: {}, Height: {}",
                    target.width, target.height
                ),
            )));
        }

        let wanted = request.refresh_rate;
        if wanted.is_unspecified() || rates.contains(&wanted.0) {
            return Ok(None);
        }

        rates.sort_unstable();
        rates.dedup();
        let available = rates
            .iter()
            .map(|rate| rate.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Some(ChangeOutcome::new(
            DisplayChangeResult::BadMode,
            format!(
                "The requested refresh rate ({}Hz) is not supported for resolution {}. \
                 Available refresh rates: {}",
                wanted.0, target, available
            ),
        )))
    }
}

#[cfg(test)]
mod tests;
