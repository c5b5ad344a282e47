use super::Frame;

// Perceived luminance weights, in thousandths so the sum over a frame stays exact.
const RED_WEIGHT: u64 = 299;
const GREEN_WEIGHT: u64 = 587;
const BLUE_WEIGHT: u64 = 114;
const WEIGHT_SCALE: u64 = RED_WEIGHT + GREEN_WEIGHT + BLUE_WEIGHT;

/// Mean perceived luminance as a percentage of white, truncated.
pub fn luma_percent(frame: &Frame) -> u8 {
    let pixels = u128::from(frame.width()) * u128::from(frame.height());
    if pixels == 0 {
        return 0;
    }

    let total: u128 = frame
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            u128::from(
                RED_WEIGHT * u64::from(r) + GREEN_WEIGHT * u64::from(g) + BLUE_WEIGHT * u64::from(b),
            )
        })
        .sum();

    let percent = total * 100 / (pixels * 255 * u128::from(WEIGHT_SCALE));
    percent.min(100) as u8
}
