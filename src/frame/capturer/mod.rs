use super::Frame;

#[cfg(test)]
use mockall::automock;

pub mod screen;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No display surface is available for capture")]
    NoMonitors,
    #[error("Screen capture failed: {0}")]
    Backend(String),
}

#[cfg_attr(test, automock)]
pub trait Capturer {
    fn capture(&self) -> Result<Frame, Error>;
}
