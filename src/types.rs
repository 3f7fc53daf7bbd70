use core::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contains the position of a display in the virtual desktop
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Contains the resolution of a display
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Creates a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A resolution is only usable when both sides are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors that occur while parsing a resolution from a string
#[derive(Error, Debug)]
pub enum ParseResolutionError {
    #[error("Error parsing integer")]
    IntError(#[from] std::num::ParseIntError),
    #[error("First integer missing")]
    FirstPart,
    #[error("Second integer missing. Expected format: <width>x<height>")]
    SecondPart,
    #[error("Unexpected trailing part `{0}`. Expected format: <width>x<height>")]
    TrailingPart(String),
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(|c| c == 'x' || c == 'X');
        let width = parts
            .next()
            .ok_or(ParseResolutionError::FirstPart)?
            .trim()
            .parse()?;
        let height = parts
            .next()
            .ok_or(ParseResolutionError::SecondPart)?
            .trim()
            .parse()?;
        if let Some(rest) = parts.next() {
            return Err(ParseResolutionError::TrailingPart(rest.to_string()));
        }
        Ok(Self::new(width, height))
    }
}

/// Refresh rate in Hz. `0` lets the driver pick its default.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RefreshRate(pub u32);

impl RefreshRate {
    /// Used whenever a caller does not ask for a specific rate
    pub const DEFAULT: RefreshRate = RefreshRate(60);

    pub fn is_unspecified(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.0)
    }
}

/// A single adapter/driver mode: resolution, refresh rate and color depth
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMode {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub refresh_rate: RefreshRate,
    pub bits_per_pixel: u32,
}

impl DisplayMode {
    pub fn new(resolution: Resolution, refresh_rate: RefreshRate, bits_per_pixel: u32) -> Self {
        Self {
            resolution,
            refresh_rate,
            bits_per_pixel,
        }
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} ({} bits)",
            self.resolution, self.refresh_rate, self.bits_per_pixel
        )
    }
}

/// Contains the orientation of a display.
///
/// The discriminants are the raw `DMDO_*` values reported by the OS.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u32", try_from = "u32")]
pub enum Orientation {
    #[default]
    Landscape = 0,
    Portrait = 1,
    LandscapeFlipped = 2,
    PortraitFlipped = 3,
}

impl Orientation {
    /// Creates an orientation from the raw `DMDO_*` value
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Orientation::Landscape),
            1 => Some(Orientation::Portrait),
            2 => Some(Orientation::LandscapeFlipped),
            3 => Some(Orientation::PortraitFlipped),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Clockwise rotation in degrees
    pub fn degrees(self) -> u32 {
        self.raw() * 90
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "Landscape"),
            Orientation::Portrait => write!(f, "Portrait"),
            Orientation::LandscapeFlipped => write!(f, "LandscapeFlipped"),
            Orientation::PortraitFlipped => write!(f, "PortraitFlipped"),
        }
    }
}

/// A raw `DMDO_*` value outside of the four known orientations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid orientation: {0}")]
pub struct InvalidOrientation(pub u32);

impl From<Orientation> for u32 {
    fn from(orientation: Orientation) -> u32 {
        orientation.raw()
    }
}

impl TryFrom<u32> for Orientation {
    type Error = InvalidOrientation;

    fn try_from(raw: u32) -> std::result::Result<Self, Self::Error> {
        Orientation::from_raw(raw).ok_or(InvalidOrientation(raw))
    }
}

bitflags! {
    /// `DISPLAY_DEVICE_*` state flags of a display device.
    ///
    /// Bits the OS reports beyond the named ones are retained. Serialized as the raw bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(into = "u32", from = "u32")]
    pub struct DisplayStateFlags: u32 {
        const ATTACHED_TO_DESKTOP = 0x0000_0001;
        const PRIMARY_DEVICE      = 0x0000_0004;
        const MIRRORING_DRIVER    = 0x0000_0008;
        const VGA_COMPATIBLE      = 0x0000_0010;
        const REMOVABLE           = 0x0000_0020;
        const REMOTE              = 0x0400_0000;
        const MODESPRUNED         = 0x0800_0000;
    }
}

impl From<DisplayStateFlags> for u32 {
    fn from(flags: DisplayStateFlags) -> u32 {
        flags.bits()
    }
}

impl From<u32> for DisplayStateFlags {
    fn from(bits: u32) -> Self {
        DisplayStateFlags::from_bits_retain(bits)
    }
}

/// Contains the settings of a display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(flatten)]
    pub mode: DisplayMode,
    pub orientation: Orientation,
    pub position: Position,
}

/// A display device as the OS enumerates it, before its settings are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDevice {
    /// Device name, e.g. `\\.\DISPLAY1`. Used as the monitor id.
    pub name: String,
    /// Human readable adapter/monitor description
    pub string: String,
    pub id: String,
    pub key: String,
    pub state_flags: DisplayStateFlags,
}

impl DisplayDevice {
    pub fn is_attached(&self) -> bool {
        self.state_flags.contains(DisplayStateFlags::ATTACHED_TO_DESKTOP)
    }

    pub fn is_primary(&self) -> bool {
        self.state_flags.contains(DisplayStateFlags::PRIMARY_DEVICE)
    }
}

/// Contains the properties of a display, snapshotted at enumeration time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: String,
    pub name: String,
    pub device_id: String,
    pub device_key: String,
    pub state_flags: DisplayStateFlags,
    pub attached_to_desktop: bool,
    pub primary_device: bool,
    pub current_settings: Option<DisplaySettings>,
}

impl Monitor {
    /// Builds a monitor snapshot from an enumerated device and its current settings
    pub fn new(device: DisplayDevice, current_settings: Option<DisplaySettings>) -> Self {
        Monitor {
            attached_to_desktop: device.is_attached(),
            primary_device: device.is_primary(),
            id: device.name,
            name: device.string,
            device_id: device.id,
            device_key: device.key,
            state_flags: device.state_flags,
            current_settings,
        }
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Monitor {{ id: {}, name: {}, primary: {}",
            self.id, self.name, self.primary_device
        )?;
        if let Some(settings) = &self.current_settings {
            write!(
                f,
                ", mode: {}, orientation: {}, position: {}",
                settings.mode, settings.orientation, settings.position
            )?;
        }
        write!(f, " }}")
    }
}

/// Horizontal and vertical dots per inch of the screen
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dpi {
    pub x: u32,
    pub y: u32,
}

impl Dpi {
    /// DPI of a display running at 100% scaling
    pub const STANDARD: Dpi = Dpi { x: 96, y: 96 };

    /// Scale factor relative to 96 DPI, as a percentage
    pub fn scale_percent(&self) -> u32 {
        self.x * 100 / Self::STANDARD.x
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} DPI ({}%)", self.x, self.y, self.scale_percent())
    }
}
