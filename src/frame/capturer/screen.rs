use super::Error;
use crate::frame::Frame;
use chrono::Local;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use itertools::{Itertools, MinMaxResult};
use xcap::Monitor;

#[derive(Default)]
pub struct Screen {}

impl super::Capturer for Screen {
    fn capture(&self) -> Result<Frame, Error> {
        let tiles = Monitor::all()
            .map_err(|err| Error::Backend(err.to_string()))?
            .iter()
            .map(|monitor| {
                Ok(Tile {
                    x: monitor.x(),
                    y: monitor.y(),
                    image: monitor
                        .capture_image()
                        .map_err(|err| Error::Backend(err.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let frame = composite(tiles)?;
        log::trace!(
            "Screen captured at {} ({}x{})",
            Local::now().format("%Y-%m-%d_%H-%M-%S"),
            frame.width(),
            frame.height()
        );

        Ok(frame)
    }
}

struct Tile {
    x: i32,
    y: i32,
    image: RgbaImage,
}

fn composite(mut tiles: Vec<Tile>) -> Result<Frame, Error> {
    if tiles.len() == 1 {
        let tile = tiles.remove(0);
        return Ok(DynamicImage::ImageRgba8(tile.image).into_rgb8());
    }

    let (left, right) = bounds(tiles.iter().flat_map(|t| {
        [i64::from(t.x), i64::from(t.x) + i64::from(t.image.width())]
    }))?;
    let (top, bottom) = bounds(tiles.iter().flat_map(|t| {
        [i64::from(t.y), i64::from(t.y) + i64::from(t.image.height())]
    }))?;

    let width = u32::try_from(right - left).map_err(|err| Error::Backend(err.to_string()))?;
    let height = u32::try_from(bottom - top).map_err(|err| Error::Backend(err.to_string()))?;

    // Areas not covered by any monitor stay black.
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    for tile in &tiles {
        imageops::overlay(
            &mut canvas,
            &tile.image,
            i64::from(tile.x) - left,
            i64::from(tile.y) - top,
        );
    }

    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

fn bounds(edges: impl Iterator<Item = i64>) -> Result<(i64, i64), Error> {
    match edges.minmax() {
        MinMaxResult::NoElements => Err(Error::NoMonitors),
        MinMaxResult::OneElement(edge) => Ok((edge, edge)),
        MinMaxResult::MinMax(min, max) => Ok((min, max)),
    }
}
