pub mod capturer;
pub mod processor;

pub type Frame = image::RgbImage;
