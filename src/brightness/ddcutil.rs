use super::{enumerated, hardware, resolve, to_percent, to_raw, DisplayHandle, Error};
use ddc_hi::{Ddc, Display, FeatureCode};
use std::cell::RefCell;

const DDC_BRIGHTNESS_FEATURE: FeatureCode = 0x10;

struct Monitor {
    display: RefCell<Display>,
    max_brightness: u64,
}

pub struct DdcUtil {
    handles: Vec<DisplayHandle>,
    monitors: Vec<Option<Monitor>>,
}

impl DdcUtil {
    pub fn new() -> Self {
        let (handles, monitors): (Vec<_>, Vec<_>) = Display::enumerate()
            .into_iter()
            .enumerate()
            .map(|(index, mut display)| {
                log::debug!("Display found: {:?}", display.info);
                let name = display_name(&display);

                match get_max_brightness(&mut display) {
                    Ok(max_brightness) => (
                        DisplayHandle {
                            index,
                            name,
                            instance: Some(display.info.id.clone()),
                        },
                        Some(Monitor {
                            display: RefCell::new(display),
                            max_brightness,
                        }),
                    ),
                    Err(err) => {
                        log::warn!("Display {index} ({name}) can't be controlled: {err}");
                        (
                            DisplayHandle {
                                index,
                                name,
                                instance: None,
                            },
                            None,
                        )
                    }
                }
            })
            .unzip();

        Self { handles, monitors }
    }

    fn monitor(&self, index: usize) -> Result<&Monitor, Error> {
        let handle = resolve(&self.handles, index)?;
        self.monitors[index]
            .as_ref()
            .ok_or_else(|| Error::UnsupportedDisplay {
                index,
                name: handle.name.clone(),
            })
    }
}

impl super::Brightness for DdcUtil {
    fn list(&self) -> Result<Vec<DisplayHandle>, Error> {
        enumerated(&self.handles)
    }

    fn get(&self, index: usize) -> Result<u64, Error> {
        let monitor = self.monitor(index)?;
        let raw = monitor
            .display
            .borrow_mut()
            .handle
            .get_vcp_feature(DDC_BRIGHTNESS_FEATURE)
            .map_err(hardware)?
            .value();
        Ok(to_percent(u64::from(raw), monitor.max_brightness))
    }

    fn set(&self, index: usize, level: u64) -> Result<u64, Error> {
        let monitor = self.monitor(index)?;
        let raw = to_raw(level, monitor.max_brightness);
        monitor
            .display
            .borrow_mut()
            .handle
            .set_vcp_feature(DDC_BRIGHTNESS_FEATURE, raw as u16)
            .map_err(hardware)?;
        self.get(index)
    }
}

fn get_max_brightness(display: &mut Display) -> Result<u64, Error> {
    if let Err(err) = display.update_capabilities() {
        log::debug!("Unable to read capabilities of {}: {}", display.info.id, err);
    }

    let max_brightness = display
        .handle
        .get_vcp_feature(DDC_BRIGHTNESS_FEATURE)
        .map_err(hardware)?
        .maximum();

    match max_brightness {
        0 => Err(Error::Hardware("display reports an empty brightness range".to_string())),
        max => Ok(u64::from(max)),
    }
}

fn display_name(display: &Display) -> String {
    match (&display.info.model_name, &display.info.serial_number) {
        (Some(model), Some(serial)) => format!("{model} {serial}"),
        (Some(model), None) => model.clone(),
        _ => display.info.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brightness::Brightness;

    // VCP reads and writes need a real monitor; scaling is covered by the shared helpers.
    fn without_monitors(handles: Vec<DisplayHandle>) -> DdcUtil {
        let monitors = handles.iter().map(|_| None).collect();
        DdcUtil { handles, monitors }
    }

    fn handle(index: usize, instance: Option<&str>) -> DisplayHandle {
        DisplayHandle {
            index,
            name: format!("DELL U2720Q {index}"),
            instance: instance.map(str::to_string),
        }
    }

    #[test]
    fn test_no_monitors_found() {
        let ddc = without_monitors(vec![]);

        assert!(matches!(ddc.list(), Err(Error::NoDisplaysFound)));
        assert!(matches!(ddc.get(0), Err(Error::NoDisplaysFound)));
        assert!(matches!(ddc.set(0, 50), Err(Error::NoDisplaysFound)));
    }

    #[test]
    fn test_list_keeps_unsupported_monitors() {
        let handles = vec![handle(0, None), handle(1, None)];
        let ddc = without_monitors(handles.clone());

        assert_eq!(handles, ddc.list().unwrap());
    }

    #[test]
    fn test_set_rejects_unsupported_and_unknown_monitors() {
        let ddc = without_monitors(vec![handle(0, None)]);

        assert!(matches!(
            ddc.set(0, 50),
            Err(Error::UnsupportedDisplay { index: 0, .. })
        ));
        assert!(matches!(
            ddc.set(1, 50),
            Err(Error::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_monitor_without_handle_is_unsupported() {
        let ddc = without_monitors(vec![handle(0, Some("i2c-4"))]);

        assert!(matches!(
            ddc.get(0),
            Err(Error::UnsupportedDisplay { index: 0, .. })
        ));
    }
}
