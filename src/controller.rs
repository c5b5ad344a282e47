use crate::brightness::Brightness;
use crate::config::app::Config;
use crate::frame::{capturer::Capturer, processor};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Default)]
pub struct Stop(Arc<AtomicBool>);

impl Stop {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Controller {
    config: Config,
    capturer: Box<dyn Capturer>,
    brightness: Box<dyn Brightness>,
    last_applied: Option<u64>,
}

impl Controller {
    pub fn new(
        config: Config,
        capturer: Box<dyn Capturer>,
        brightness: Box<dyn Brightness>,
    ) -> Self {
        Self {
            config,
            capturer,
            brightness,
            last_applied: None,
        }
    }

    pub fn run(&mut self, stop: &Stop) -> Result<()> {
        while !stop.raised() {
            self.step(stop)?;

            if self.config.sleep {
                sleep(self.config.interval, stop);
            }
        }

        log::info!("Stopped watching luminance.");
        Ok(())
    }

    fn step(&mut self, stop: &Stop) -> Result<()> {
        let frame = self
            .capturer
            .capture()
            .context("Unable to capture the screen")?;
        let luma = processor::luma_percent(&frame);
        let candidate = target_brightness(luma, &self.config);

        log::debug!("Luma: {luma}%, candidate brightness: {candidate}%");

        // Interrupted mid-tick: drop the candidate rather than touching the hardware.
        if stop.raised() || !self.should_apply(candidate) {
            return Ok(());
        }

        let display = self.config.output.display();
        let applied = self
            .brightness
            .set(display, candidate)
            .with_context(|| format!("Unable to set brightness of display {display}"))?;

        log::info!(
            "Display {display}: brightness set to {candidate}% (hardware reports {applied}%)"
        );
        self.last_applied = Some(applied);

        Ok(())
    }

    fn should_apply(&self, candidate: u64) -> bool {
        match self.last_applied {
            Some(last) => last.abs_diff(candidate) > self.config.tolerance,
            None => true,
        }
    }
}

pub fn target_brightness(luma: u8, config: &Config) -> u64 {
    let candidate = (config.max_brightness * 2).saturating_sub(u64::from(luma)) / 2;
    candidate.clamp(config.min_brightness, config.max_brightness)
}

// An interval too long to land on the clock sleeps until stopped.
fn sleep(duration: Duration, stop: &Stop) {
    let deadline = Instant::now().checked_add(duration);
    while !stop.raised() {
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => SLEEP_SLICE,
        };
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(SLEEP_SLICE));
    }
}
