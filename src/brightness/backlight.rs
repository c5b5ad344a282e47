use super::{enumerated, resolve, to_percent, to_raw, DisplayHandle, Error};
use crate::device_file::{read, write};
use itertools::Itertools;
use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

struct Device {
    file: RefCell<File>,
    max_brightness: u64,
}

impl Device {
    fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.join("brightness"))?;

        let max_brightness: u64 = fs::read_to_string(path.join("max_brightness"))?
            .trim()
            .parse()?;
        if max_brightness == 0 {
            return Err("max_brightness is 0".into());
        }

        Ok(Self {
            file: RefCell::new(file),
            max_brightness,
        })
    }
}

pub struct Backlight {
    handles: Vec<DisplayHandle>,
    devices: Vec<Option<Device>>,
}

impl Backlight {
    pub fn new(path: &str) -> Result<Self, Error> {
        let paths = fs::read_dir(path)
            .map_err(|err| Error::Hardware(format!("Unable to read '{path}': {err}")))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .sorted()
            .collect_vec();

        let (handles, devices): (Vec<_>, Vec<_>) = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();

                match Device::open(path) {
                    Ok(device) => (
                        DisplayHandle {
                            index,
                            name,
                            instance: Some(path.display().to_string()),
                        },
                        Some(device),
                    ),
                    Err(err) => {
                        log::warn!("Backlight {index} ({name}) can't be controlled: {err}");
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

        Ok(Self { handles, devices })
    }

    fn device(&self, index: usize) -> Result<&Device, Error> {
        let handle = resolve(&self.handles, index)?;
        self.devices[index]
            .as_ref()
            .ok_or_else(|| Error::UnsupportedDisplay {
                index,
                name: handle.name.clone(),
            })
    }
}

impl super::Brightness for Backlight {
    fn list(&self) -> Result<Vec<DisplayHandle>, Error> {
        enumerated(&self.handles)
    }

    fn get(&self, index: usize) -> Result<u64, Error> {
        let device = self.device(index)?;
        let raw = read(&mut device.file.borrow_mut())
            .map_err(|err| Error::Hardware(err.to_string()))?;
        Ok(to_percent(raw, device.max_brightness))
    }

    fn set(&self, index: usize, level: u64) -> Result<u64, Error> {
        let device = self.device(index)?;
        write(
            &mut device.file.borrow_mut(),
            to_raw(level, device.max_brightness),
        )
        .map_err(|err| Error::Hardware(err.to_string()))?;
        self.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brightness::Brightness;
    use tempfile::TempDir;

    fn device(root: &Path, name: &str, brightness: Option<&str>, max: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        if let Some(brightness) = brightness {
            fs::write(dir.join("brightness"), brightness).unwrap();
        }
        if let Some(max) = max {
            fs::write(dir.join("max_brightness"), max).unwrap();
        }
    }

    fn setup() -> (TempDir, Backlight) {
        let root = tempfile::tempdir().unwrap();
        device(root.path(), "intel_backlight", Some("600\n"), Some("1200\n"));
        device(root.path(), "acpi_video0", Some("3\n"), None);
        let backlight = Backlight::new(root.path().to_str().unwrap()).unwrap();
        (root, backlight)
    }

    #[test]
    fn test_list_marks_devices_without_max_brightness_unsupported() {
        let (root, backlight) = setup();

        let handles = backlight.list().unwrap();

        assert_eq!(
            vec![
                DisplayHandle {
                    index: 0,
                    name: "acpi_video0".to_string(),
                    instance: None,
                },
                DisplayHandle {
                    index: 1,
                    name: "intel_backlight".to_string(),
                    instance: Some(root.path().join("intel_backlight").display().to_string()),
                },
            ],
            handles
        );
    }

    #[test]
    fn test_list_without_devices() {
        let root = tempfile::tempdir().unwrap();
        let backlight = Backlight::new(root.path().to_str().unwrap()).unwrap();

        assert!(matches!(backlight.list(), Err(Error::NoDisplaysFound)));
        assert!(matches!(backlight.set(0, 50), Err(Error::NoDisplaysFound)));
    }

    #[test]
    fn test_missing_class_directory() {
        assert!(matches!(
            Backlight::new("/nonexistent/backlight"),
            Err(Error::Hardware(_))
        ));
    }

    #[test]
    fn test_get_scales_to_percent() {
        let (_root, backlight) = setup();

        assert_eq!(50, backlight.get(1).unwrap());
    }

    #[test]
    fn test_set_writes_raw_value_and_reports_hardware_level() {
        let (root, backlight) = setup();

        assert_eq!(70, backlight.set(1, 70).unwrap());

        let raw = fs::read_to_string(root.path().join("intel_backlight/brightness")).unwrap();
        assert_eq!(Some("840"), raw.split_whitespace().next());
    }

    #[test]
    fn test_set_rejects_unsupported_and_unknown_displays() {
        let (_root, backlight) = setup();

        assert!(matches!(
            backlight.set(0, 50),
            Err(Error::UnsupportedDisplay { index: 0, .. })
        ));
        assert!(matches!(
            backlight.set(2, 50),
            Err(Error::IndexOutOfRange { index: 2, count: 2 })
        ));
    }
}
