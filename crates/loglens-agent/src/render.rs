//! Bar chart rasterization.
//!
//! Renders a [`Figure`] into an RGB pixel buffer and encodes it as PNG.
//! Output is deterministic for a given figure and chart size. Category
//! labels are not drawn; the accompanying answer text names the column and
//! the categories in rank order.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use tracing::debug;

use loglens_core::config::ChartConfig;

use crate::error::AgentError;
use crate::surface::Figure;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([64, 64, 64]);
const GRID: Rgb<u8> = Rgb([224, 224, 224]);
const BAR: Rgb<u8> = Rgb([70, 114, 196]);

const MARGIN_LEFT: u32 = 40;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 16;
const MARGIN_BOTTOM: u32 = 30;

/// Rasterize a figure into PNG bytes.
pub fn render_png(figure: &Figure, config: &ChartConfig) -> Result<Vec<u8>, AgentError> {
    let width = config.width;
    let height = config.height;
    if width < MARGIN_LEFT + MARGIN_RIGHT + 40 || height < MARGIN_TOP + MARGIN_BOTTOM + 40 {
        return Err(AgentError::Chart(format!(
            "chart area {}x{} is too small",
            width, height
        )));
    }
    if figure.bars.is_empty() {
        return Err(AgentError::Chart("figure has no bars".to_string()));
    }

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let plot_w = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;
    let base_y = height - MARGIN_BOTTOM;

    // Horizontal gridlines at quarter intervals of the value axis.
    for quarter in 1..=4u32 {
        let y = base_y - plot_h * quarter / 4;
        hline(&mut img, MARGIN_LEFT, MARGIN_LEFT + plot_w, y, GRID);
    }

    // Bars, left to right in figure order.
    let max_value = figure.bars.iter().map(|b| b.value).max().unwrap_or(1).max(1);
    let n = figure.bars.len() as u32;
    let slot = (plot_w / n).max(1);
    let bar_w = (slot * 7 / 10).max(1);

    for (i, bar) in figure.bars.iter().enumerate() {
        let slot_x = MARGIN_LEFT + slot * i as u32;
        let x0 = slot_x + (slot - bar_w) / 2;
        let bar_h = ((bar.value as u64 * plot_h as u64) / max_value as u64) as u32;
        let y0 = base_y - bar_h;
        fill_rect(&mut img, x0, y0, bar_w, bar_h, BAR);

        // Tick mark under the bar center.
        let tick_x = x0 + bar_w / 2;
        vline(&mut img, tick_x, base_y, (base_y + 4).min(height - 1), AXIS);
    }

    // Axes drawn last so bars never overpaint them.
    vline(&mut img, MARGIN_LEFT - 1, MARGIN_TOP, base_y, AXIS);
    hline(&mut img, MARGIN_LEFT - 1, MARGIN_LEFT + plot_w, base_y, AXIS);

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| AgentError::Chart(e.to_string()))?;

    debug!(
        bars = figure.bars.len(),
        bytes = png.len(),
        title = %figure.title,
        "Chart rendered"
    );
    Ok(png)
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

fn hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
    if y >= img.height() {
        return;
    }
    for x in x0..x1.min(img.width()) {
        img.put_pixel(x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    if x >= img.width() {
        return;
    }
    for y in y0..y1.min(img.height()) {
        img.put_pixel(x, y, color);
    }
}
