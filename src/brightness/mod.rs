mod backlight;
mod ddcutil;

pub use backlight::Backlight;
pub use ddcutil::DdcUtil;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHandle {
    pub index: usize,
    pub name: String,
    // None when the display can't be driven
    pub instance: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No displays supporting software brightness control were found")]
    NoDisplaysFound,
    #[error("Display {index} does not exist, {count} display(s) were found")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Display {index} ({name}) does not support software brightness control")]
    UnsupportedDisplay { index: usize, name: String },
    #[error("Brightness command failed: {0}")]
    Hardware(String),
}

#[cfg_attr(test, automock)]
pub trait Brightness {
    fn list(&self) -> Result<Vec<DisplayHandle>, Error>;

    fn get(&self, index: usize) -> Result<u64, Error>;

    /// Returns the level the hardware reports afterwards, not the requested one.
    fn set(&self, index: usize, level: u64) -> Result<u64, Error>;
}

pub fn resolve(handles: &[DisplayHandle], index: usize) -> Result<&DisplayHandle, Error> {
    if handles.is_empty() {
        return Err(Error::NoDisplaysFound);
    }

    let handle = handles.get(index).ok_or(Error::IndexOutOfRange {
        index,
        count: handles.len(),
    })?;

    match handle.instance {
        Some(_) => Ok(handle),
        None => Err(Error::UnsupportedDisplay {
            index,
            name: handle.name.clone(),
        }),
    }
}

fn enumerated(handles: &[DisplayHandle]) -> Result<Vec<DisplayHandle>, Error> {
    if handles.is_empty() {
        Err(Error::NoDisplaysFound)
    } else {
        Ok(handles.to_vec())
    }
}

fn to_raw(percent: u64, max_raw: u64) -> u64 {
    (percent.min(100) * max_raw + 50) / 100
}

fn to_percent(raw: u64, max_raw: u64) -> u64 {
    (raw.min(max_raw) * 100 + max_raw / 2) / max_raw
}

fn hardware<E: std::fmt::Display>(err: E) -> Error {
    Error::Hardware(err.to_string())
}

pub fn describe(brightness: &dyn Brightness) -> Result<Vec<String>, Error> {
    Ok(brightness
        .list()?
        .into_iter()
        .map(|handle| {
            let level = handle.instance.as_ref().and_then(|_| {
                brightness
                    .get(handle.index)
                    .map_err(|err| log::warn!("Unable to read display {}: {err}", handle.index))
                    .ok()
            });
            match level {
                Some(level) => format!("Display {}: {} ({level}%)", handle.index, handle.name),
                None => format!("Display {}: {} (unsupported)", handle.index, handle.name),
            }
        })
        .collect())
}
