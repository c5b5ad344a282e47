use super::{cli::Cli, file, Error};
use clap::ValueEnum;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TOLERANCE: u64 = 5;
pub const MIN_TOLERANCE: u64 = 5;
pub const DEFAULT_MIN_BRIGHTNESS: u64 = 0;
pub const DEFAULT_MAX_BRIGHTNESS: u64 = 100;
pub const BRIGHTNESS_CEILING: u64 = 100;
pub const DEFAULT_INTERVAL_SECS: f64 = 0.5;
pub const MIN_INTERVAL_SECS: f64 = 0.1;
pub const DEFAULT_BACKLIGHT_PATH: &str = "/sys/class/backlight";

#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    #[value(name = "ddcutil")]
    DdcUtil,
    #[value(name = "backlight")]
    Backlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    DdcUtil { display: usize },
    Backlight { display: usize, path: String },
}

impl Output {
    pub fn display(&self) -> usize {
        match self {
            Output::DdcUtil { display } => *display,
            Output::Backlight { display, .. } => *display,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tolerance: u64,
    pub min_brightness: u64,
    pub max_brightness: u64,
    pub interval: Duration,
    pub sleep: bool,
    pub output: Output,
}

impl Config {
    // Command line over file over defaults, validated after merging.
    pub fn resolve(cli: &Cli, file: file::Config) -> Result<Self, Error> {
        let tolerance = validate_tolerance(
            cli.tolerance
                .or(file.tolerance)
                .unwrap_or(DEFAULT_TOLERANCE),
        )?;
        let min_brightness = validate_min_brightness(
            cli.min_brightness
                .or(file.min_brightness)
                .unwrap_or(DEFAULT_MIN_BRIGHTNESS),
        )?;
        let max_brightness = validate_max_brightness(
            cli.max_brightness
                .or(file.max_brightness)
                .unwrap_or(DEFAULT_MAX_BRIGHTNESS),
        )?;
        if min_brightness > max_brightness {
            return Err(Error::Validation {
                field: "min brightness",
                reason: format!(
                    "{min_brightness} is greater than max brightness {max_brightness}"
                ),
            });
        }

        let interval = validate_interval(
            cli.interval
                .or(file.interval)
                .unwrap_or(DEFAULT_INTERVAL_SECS),
        )?;

        let display = cli.display.or(file.output.display).unwrap_or(0);
        let output = match cli.backend.or(file.output.backend).unwrap_or_default() {
            Backend::DdcUtil => Output::DdcUtil { display },
            Backend::Backlight => Output::Backlight {
                display,
                path: file
                    .output
                    .path
                    .unwrap_or_else(|| DEFAULT_BACKLIGHT_PATH.to_string()),
            },
        };

        Ok(Self {
            tolerance,
            min_brightness,
            max_brightness,
            interval,
            sleep: !cli.no_sleep && file.sleep.unwrap_or(true),
            output,
        })
    }
}

pub fn validate_tolerance(value: u64) -> Result<u64, Error> {
    if value < MIN_TOLERANCE {
        return Err(Error::Validation {
            field: "tolerance",
            reason: format!("must be at least {MIN_TOLERANCE}, got {value}"),
        });
    }
    Ok(value)
}

pub fn validate_min_brightness(value: u64) -> Result<u64, Error> {
    if value > BRIGHTNESS_CEILING {
        return Err(Error::Validation {
            field: "min brightness",
            reason: format!("must be at most {BRIGHTNESS_CEILING}, got {value}"),
        });
    }
    Ok(value)
}

pub fn validate_max_brightness(value: u64) -> Result<u64, Error> {
    if value > BRIGHTNESS_CEILING {
        return Err(Error::Validation {
            field: "max brightness",
            reason: format!("must be at most {BRIGHTNESS_CEILING}, got {value}"),
        });
    }
    Ok(value)
}

pub fn validate_interval(value: f64) -> Result<Duration, Error> {
    let invalid = || Error::Validation {
        field: "interval",
        reason: format!("must be a number of seconds of at least {MIN_INTERVAL_SECS}, got {value}"),
    };
    if !value.is_finite() || value < MIN_INTERVAL_SECS {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(value).map_err(|_| invalid())
}
