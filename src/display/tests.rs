use std::cell::RefCell;

use super::*;
use crate::platform::PlatformResult;
use crate::{
    DisplayDevice, DisplaySettings, DisplayStateFlags, ModeChange, Orientation, Position,
    RefreshRate,
};

const PRIMARY: &str = r"\\.\DISPLAY1";
const SECONDARY: &str = r"\\.\DISPLAY2";
const DETACHED: &str = r"\\.\DISPLAY3";

fn mode(width: u32, height: u32, hz: u32, bits: u32) -> DisplayMode {
    DisplayMode::new(Resolution::new(width, height), RefreshRate(hz), bits)
}

struct FakeMonitor {
    device: DisplayDevice,
    settings: Option<DisplaySettings>,
    modes: Vec<DisplayMode>,
    reject_with: Option<DisplayChangeResult>,
}

impl FakeMonitor {
    fn new(name: &str, flags: DisplayStateFlags, x: i32) -> Self {
        let modes = vec![
            mode(1920, 1080, 60, 32),
            mode(1920, 1080, 144, 32),
            mode(1920, 1080, 60, 32),
            mode(1920, 1080, 60, 16),
            mode(1280, 720, 60, 32),
            mode(1280, 720, 144, 32),
        ];
        FakeMonitor {
            device: DisplayDevice {
                name: name.to_string(),
                string: format!("Generic PnP Monitor on {}", name),
                id: format!("MONITOR\\FAKE{}", x),
                key: format!("\\Registry\\Machine\\System\\Video\\{}", x),
                state_flags: flags,
            },
            settings: Some(DisplaySettings {
                mode: modes[0],
                orientation: Orientation::Landscape,
                position: Position::new(x, 0),
            }),
            modes,
            reject_with: None,
        }
    }
}

/// In-memory stand-in for the OS display configuration
#[derive(Default)]
struct FakeDisplays {
    monitors: RefCell<Vec<FakeMonitor>>,
    changes: RefCell<Vec<(String, ModeChange)>>,
    enumeration_broken: bool,
    modes_broken_for: Option<&'static str>,
}

impl FakeDisplays {
    fn single() -> Self {
        let fake = FakeDisplays::default();
        fake.monitors.borrow_mut().push(FakeMonitor::new(
            PRIMARY,
            DisplayStateFlags::ATTACHED_TO_DESKTOP | DisplayStateFlags::PRIMARY_DEVICE,
            0,
        ));
        fake
    }

    fn dual() -> Self {
        let fake = FakeDisplays::single();
        fake.monitors.borrow_mut().push(FakeMonitor::new(
            SECONDARY,
            DisplayStateFlags::ATTACHED_TO_DESKTOP,
            1920,
        ));
        fake.monitors.borrow_mut().push(FakeMonitor::new(
            DETACHED,
            DisplayStateFlags::empty(),
            3840,
        ));
        fake
    }

    fn change_count(&self) -> usize {
        self.changes.borrow().len()
    }

    fn resolve(&self, device: Option<&str>) -> Option<usize> {
        self.monitors.borrow().iter().position(|monitor| match device {
            Some(name) => monitor.device.name == name,
            None => monitor.device.is_primary(),
        })
    }
}

impl DisplayApi for FakeDisplays {
    fn enumerate_devices(&self) -> PlatformResult<Vec<DisplayDevice>> {
        if self.enumeration_broken {
            return Err(PlatformError::Unsupported);
        }
        Ok(self
            .monitors
            .borrow()
            .iter()
            .map(|monitor| monitor.device.clone())
            .collect())
    }

    fn current_settings(&self, device: Option<&str>) -> PlatformResult<DisplaySettings> {
        let name = device.unwrap_or("primary").to_string();
        let index = self
            .resolve(device)
            .ok_or_else(|| PlatformError::NoSettings(name.clone()))?;
        self.monitors.borrow()[index]
            .settings
            .ok_or(PlatformError::NoSettings(name))
    }

    fn enumerate_modes(&self, device: &str) -> PlatformResult<Vec<DisplayMode>> {
        if self.modes_broken_for == Some(device) {
            return Err(PlatformError::NoSettings(device.to_string()));
        }
        Ok(self
            .resolve(Some(device))
            .map(|index| self.monitors.borrow()[index].modes.clone())
            .unwrap_or_default())
    }

    fn change_mode(&self, device: Option<&str>, change: &ModeChange) -> DisplayChangeResult {
        let Some(index) = self.resolve(device) else {
            return DisplayChangeResult::BadParam;
        };
        let mut monitors = self.monitors.borrow_mut();
        let monitor = &mut monitors[index];
        self.changes
            .borrow_mut()
            .push((monitor.device.name.clone(), *change));

        if let Some(code) = monitor.reject_with {
            return code;
        }
        let applied = monitor.modes.iter().copied().find(|mode| {
            let rate_matches =
                change.refresh_rate.is_unspecified() || mode.refresh_rate == change.refresh_rate;
            mode.resolution == change.resolution && rate_matches
        });
        match (applied, monitor.settings.as_mut()) {
            (Some(applied), Some(settings)) => {
                settings.mode = applied;
                DisplayChangeResult::Successful
            }
            _ => DisplayChangeResult::BadMode,
        }
    }

    fn query_dpi(&self) -> PlatformResult<Dpi> {
        Ok(Dpi::STANDARD)
    }
}

#[test_log::test]
fn lists_attached_monitors_in_os_order() {
    let control = DisplayControl::new(FakeDisplays::dual());
    let monitors = control.list_monitors();

    let ids: Vec<&str> = monitors.iter().map(|monitor| monitor.id.as_str()).collect();
    assert_eq!(ids, vec![PRIMARY, SECONDARY]);
    assert_eq!(monitors.iter().filter(|monitor| monitor.primary_device).count(), 1);
    assert!(monitors.iter().all(|monitor| monitor.attached_to_desktop));

    let secondary = &monitors[1];
    assert_eq!(secondary.current_settings.unwrap().position, Position::new(1920, 0));
    assert_eq!(secondary.device_key, "\\Registry\\Machine\\System\\Video\\1920");
}

#[test_log::test]
fn broken_enumeration_lists_nothing() {
    let fake = FakeDisplays {
        enumeration_broken: true,
        ..FakeDisplays::single()
    };
    let control = DisplayControl::new(fake);
    assert!(control.list_monitors().is_empty());
}

#[test_log::test]
fn monitor_without_settings_is_still_listed() {
    let fake = FakeDisplays::dual();
    fake.monitors.borrow_mut()[1].settings = None;
    let control = DisplayControl::new(&fake);

    let monitors = control.list_monitors();
    assert_eq!(monitors.len(), 2);
    assert!(monitors[0].current_settings.is_some());
    assert!(monitors[1].current_settings.is_none());
    assert!(matches!(
        control.monitor_resolution(SECONDARY),
        Err(DisplayError::Platform(PlatformError::NoSettings(_)))
    ));
}

#[test_log::test]
fn reads_primary_and_per_monitor_resolution() {
    let fake = FakeDisplays::dual();
    fake.monitors.borrow_mut()[1].settings.as_mut().unwrap().mode = mode(1280, 720, 60, 32);
    let control = DisplayControl::new(&fake);

    assert_eq!(control.screen_resolution().unwrap(), mode(1920, 1080, 60, 32));
    assert_eq!(control.monitor_resolution(SECONDARY).unwrap(), mode(1280, 720, 60, 32));
}

#[test_log::test]
fn unknown_or_detached_monitor_is_not_found() {
    let control = DisplayControl::new(FakeDisplays::dual());

    assert!(matches!(
        control.monitor_resolution(r"\\.\DISPLAY9"),
        Err(DisplayError::NotFound(id)) if id == r"\\.\DISPLAY9"
    ));
    assert!(matches!(
        control.available_resolutions(DETACHED),
        Err(DisplayError::NotFound(_))
    ));
}

#[test_log::test]
fn available_resolutions_drop_only_exact_duplicates() {
    let control = DisplayControl::new(FakeDisplays::single());
    let modes = control.available_resolutions(PRIMARY).unwrap();

    assert_eq!(
        modes,
        vec![
            mode(1920, 1080, 60, 32),
            mode(1920, 1080, 144, 32),
            mode(1920, 1080, 60, 16),
            mode(1280, 720, 60, 32),
            mode(1280, 720, 144, 32),
        ]
    );
    assert!(modes.iter().all(|mode| mode.width() > 0 && mode.height() > 0));
}

#[test_log::test]
fn set_then_get_round_trips() {
    let control = DisplayControl::new(FakeDisplays::dual());

    let outcome = control
        .set_monitor_resolution(SECONDARY, &ModeRequest::new(1280, 720))
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.message, "The display settings change was successful");

    let current = control.monitor_resolution(SECONDARY).unwrap();
    assert_eq!(current.resolution, Resolution::new(1280, 720));
    assert_eq!(current.refresh_rate, RefreshRate(60));
}

#[test_log::test]
fn unknown_id_never_reaches_the_platform() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let result = control.set_monitor_resolution(r"\\.\DISPLAY7", &ModeRequest::new(1280, 720));
    assert!(matches!(result, Err(DisplayError::NotFound(_))));
    assert_eq!(fake.change_count(), 0);
}

#[test_log::test]
fn zero_dimensions_are_rejected_locally() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    assert!(matches!(
        control.set_monitor_resolution(PRIMARY, &ModeRequest::new(0, 720)),
        Err(DisplayError::InvalidDimensions(_))
    ));
    assert!(matches!(
        control.set_all_screen_resolutions(&ModeRequest::new(1280, 0)),
        Err(DisplayError::InvalidDimensions(_))
    ));
    assert_eq!(fake.change_count(), 0);
}

#[test_log::test]
fn unsupported_resolution_is_bad_mode_without_a_change() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_monitor_resolution(PRIMARY, &ModeRequest::new(800, 600))
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::BadMode);
    assert_eq!(
        outcome.message,
        "The requested resolution is not supported. Width: 800, Height: 600"
    );
    assert_eq!(fake.change_count(), 0);
}

#[test_log::test]
fn unsupported_refresh_rate_lists_available_rates() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_monitor_resolution(PRIMARY, &ModeRequest::new(1920, 1080).with_refresh_rate(75))
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::BadMode);
    assert!(outcome.message.contains("(75Hz)"));
    assert!(outcome.message.ends_with("Available refresh rates: 60, 144"));
    assert_eq!(fake.change_count(), 0);
}

#[test_log::test]
fn unspecified_refresh_rate_is_left_to_the_driver() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_monitor_resolution(PRIMARY, &ModeRequest::new(1280, 720).with_refresh_rate(0))
        .unwrap();
    assert!(outcome.is_success());
    let changes = fake.changes.borrow();
    assert_eq!(changes.len(), 1);
    assert!(changes[0].1.refresh_rate.is_unspecified());
}

#[test_log::test]
fn platform_outcome_is_returned_verbatim() {
    let fake = FakeDisplays::single();
    fake.monitors.borrow_mut()[0].reject_with = Some(DisplayChangeResult::Restart);
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_monitor_resolution(PRIMARY, &ModeRequest::new(1280, 720).temporary())
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::Restart);
    assert!(!outcome.is_success());
    assert_eq!(fake.change_count(), 1);
    assert!(!fake.changes.borrow()[0].1.persist);
}

#[test_log::test]
fn unvalidated_request_goes_straight_to_the_platform() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_monitor_resolution(PRIMARY, &ModeRequest::new(800, 600).without_validation())
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::BadMode);
    assert_eq!(outcome.message, "The graphics mode is not supported");
    assert_eq!(fake.change_count(), 1);
}

#[test_log::test]
fn system_dpi_at_standard_scaling() {
    let control = DisplayControl::new(FakeDisplays::single());
    assert_eq!(control.system_dpi().unwrap(), Dpi { x: 96, y: 96 });
}

#[test_log::test]
fn set_all_on_a_single_monitor() {
    let fake = FakeDisplays::single();
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_all_screen_resolutions(&ModeRequest::new(1280, 720))
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::Successful);
    assert_eq!(
        control.screen_resolution().unwrap().resolution,
        Resolution::new(1280, 720)
    );
}

#[test_log::test]
fn set_all_keeps_going_after_a_failure() {
    let fake = FakeDisplays::dual();
    fake.monitors.borrow_mut()[0].reject_with = Some(DisplayChangeResult::Failed);
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_all_screen_resolutions(&ModeRequest::new(1280, 720))
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::Failed);
    assert!(outcome.message.starts_with(PRIMARY));

    let changed: Vec<String> = fake
        .changes
        .borrow()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert_eq!(changed, vec![PRIMARY.to_string(), SECONDARY.to_string()]);
    assert_eq!(
        control.monitor_resolution(SECONDARY).unwrap().resolution,
        Resolution::new(1280, 720)
    );
}

#[test_log::test]
fn set_all_keeps_going_after_a_query_error() {
    let fake = FakeDisplays {
        modes_broken_for: Some(PRIMARY),
        ..FakeDisplays::dual()
    };
    let control = DisplayControl::new(&fake);

    let outcome = control
        .set_all_screen_resolutions(&ModeRequest::new(1280, 720))
        .unwrap();
    assert_eq!(outcome.code, DisplayChangeResult::Failed);
    assert!(outcome.message.starts_with(PRIMARY));

    let changed: Vec<String> = fake
        .changes
        .borrow()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert_eq!(changed, vec![SECONDARY.to_string()]);
    assert_eq!(
        control.monitor_resolution(SECONDARY).unwrap().resolution,
        Resolution::new(1280, 720)
    );
}

#[test_log::test]
fn set_all_without_monitors() {
    let control = DisplayControl::new(FakeDisplays::default());
    assert!(matches!(
        control.set_all_screen_resolutions(&ModeRequest::new(1280, 720)),
        Err(DisplayError::NoMonitors)
    ));
}
