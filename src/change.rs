use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{RefreshRate, Resolution};

/// Outcome of a display mode change, mirroring the `DISP_CHANGE_*` codes.
///
/// The discriminants are stable and independent of the native codes; use
/// [`DisplayChangeResult::from_native`] to translate what the OS returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayChangeResult {
    #[serde(rename = "SUCCESSFUL")]
    Successful = 0,
    #[serde(rename = "BADDUALVIEW")]
    BadDualView = 1,
    #[serde(rename = "BADFLAGS")]
    BadFlags = 2,
    #[serde(rename = "BADMODE")]
    BadMode = 3,
    #[serde(rename = "BADPARAM")]
    BadParam = 4,
    #[serde(rename = "FAILED")]
    Failed = 5,
    #[serde(rename = "NOTUPDATED")]
    NotUpdated = 6,
    #[serde(rename = "RESTART")]
    Restart = 7,
}

impl DisplayChangeResult {
    /// Translates a native `DISP_CHANGE_*` value, `None` for codes the OS does not document
    pub fn from_native(code: i32) -> Option<Self> {
        match code {
            0 => Some(DisplayChangeResult::Successful),
            1 => Some(DisplayChangeResult::Restart),
            -1 => Some(DisplayChangeResult::Failed),
            -2 => Some(DisplayChangeResult::BadMode),
            -3 => Some(DisplayChangeResult::NotUpdated),
            -4 => Some(DisplayChangeResult::BadFlags),
            -5 => Some(DisplayChangeResult::BadParam),
            -6 => Some(DisplayChangeResult::BadDualView),
            _ => None,
        }
    }

    /// The native `DISP_CHANGE_*` value
    pub fn native(self) -> i32 {
        match self {
            DisplayChangeResult::Successful => 0,
            DisplayChangeResult::Restart => 1,
            DisplayChangeResult::Failed => -1,
            DisplayChangeResult::BadMode => -2,
            DisplayChangeResult::NotUpdated => -3,
            DisplayChangeResult::BadFlags => -4,
            DisplayChangeResult::BadParam => -5,
            DisplayChangeResult::BadDualView => -6,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn is_success(self) -> bool {
        self == DisplayChangeResult::Successful
    }

    pub fn message(self) -> &'static str {
        match self {
            DisplayChangeResult::Successful => "The display settings change was successful",
            DisplayChangeResult::BadDualView => {
                "The settings change was unsuccessful because the system is DualView capable"
            }
            DisplayChangeResult::BadFlags => "An invalid set of flags was passed",
            DisplayChangeResult::BadMode => "The graphics mode is not supported",
            DisplayChangeResult::BadParam => "An invalid parameter was passed",
            DisplayChangeResult::Failed => "The display driver failed the specified graphics mode",
            DisplayChangeResult::NotUpdated => "Unable to write settings to the registry",
            DisplayChangeResult::Restart => {
                "The computer must be restarted for the graphics mode to work"
            }
        }
    }
}

impl fmt::Display for DisplayChangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A change result together with a human readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOutcome {
    pub code: DisplayChangeResult,
    pub message: String,
}

impl ChangeOutcome {
    pub fn new(code: DisplayChangeResult, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn success() -> Self {
        DisplayChangeResult::Successful.into()
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl From<DisplayChangeResult> for ChangeOutcome {
    fn from(code: DisplayChangeResult) -> Self {
        Self::new(code, code.message())
    }
}

impl fmt::Display for ChangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}): {}", self.code, self.code.code(), self.message)
    }
}

/// A requested display mode.
///
/// | field          | default |
/// |----------------|---------|
/// | `refresh_rate` | 60 Hz   |
/// | `validate`     | `true`  |
/// | `persist`      | `true`  |
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRequest {
    pub resolution: Resolution,
    /// `0` keeps whatever rate the driver picks for the resolution
    pub refresh_rate: RefreshRate,
    /// Check the mode against the driver's mode list before asking for the change
    pub validate: bool,
    /// Store the mode in the registry so it survives a re-login
    pub persist: bool,
}

impl ModeRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from(Resolution::new(width, height))
    }

    pub fn with_refresh_rate(mut self, refresh_rate: u32) -> Self {
        self.refresh_rate = RefreshRate(refresh_rate);
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Apply for the current session only
    pub fn temporary(mut self) -> Self {
        self.persist = false;
        self
    }

    pub(crate) fn to_change(self) -> ModeChange {
        ModeChange {
            resolution: self.resolution,
            refresh_rate: self.refresh_rate,
            persist: self.persist,
        }
    }
}

impl From<Resolution> for ModeRequest {
    fn from(resolution: Resolution) -> Self {
        Self {
            resolution,
            refresh_rate: RefreshRate::DEFAULT,
            validate: true,
            persist: true,
        }
    }
}

/// What the platform change primitive is asked to apply
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModeChange {
    pub resolution: Resolution,
    pub refresh_rate: RefreshRate,
    pub persist: bool,
}
