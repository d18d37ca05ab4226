//! Built-in raster backend: paint commands to an RGBA buffer to PNG.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops, ImageEncoder, Rgba, RgbaImage};

use crate::rendering::layout::layout_card;
use crate::rendering::paint::{commands_for, PaintCommand};
use crate::rendering::{RasterOptions, RasterSurface, Rasterizer};
use crate::{Card, Error, Result, Viewport};

const PLACEHOLDER_FILL: [u8; 4] = [205, 205, 205, 255];

/// Pure-Rust capture backend over the block layout.
///
/// Output is fully deterministic for a given card, viewport, and options,
/// which is what the golden tests rely on.
pub struct BlockRasterizer {
    viewport: Viewport,
}

impl BlockRasterizer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }
}

impl Rasterizer for BlockRasterizer {
    fn rasterize(&self, card: &Card, options: &RasterOptions) -> Result<RasterSurface> {
        if options.scale <= 0.0 {
            return Err(Error::RenderError(format!(
                "Invalid scale {}",
                options.scale
            )));
        }

        let nodes = layout_card(card, self.viewport);
        let cmds = commands_for(&nodes);
        let s = options.scale;
        let width = ((self.viewport.width as f32 * s).round() as u32).max(1);
        let height = ((self.viewport.height as f32 * s).round() as u32).max(1);

        let bg = options.background.unwrap_or([0, 0, 0, 0]);
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(bg));

        for cmd in &cmds {
            match cmd {
                PaintCommand::SolidRect {
                    x,
                    y,
                    width: w,
                    height: h,
                    rgba,
                } => {
                    let (r, g, b, a) = *rgba;
                    fill_rect(&mut canvas, scale_rect(*x, *y, *w, *h, s), [r, g, b, a]);
                }
                PaintCommand::ImageBox {
                    x,
                    y,
                    width: w,
                    height: h,
                    src,
                } => {
                    let rect = scale_rect(*x, *y, *w, *h, s);
                    match src.as_deref() {
                        Some(src) if src.starts_with("data:") => match decode_data_image(src) {
                            Ok(pixels) => {
                                let resized = imageops::resize(
                                    &pixels,
                                    rect.2.max(1),
                                    rect.3.max(1),
                                    imageops::FilterType::Nearest,
                                );
                                imageops::overlay(
                                    &mut canvas,
                                    &resized,
                                    rect.0 as i64,
                                    rect.1 as i64,
                                );
                            }
                            Err(e) => {
                                if options.logging {
                                    log::debug!("Undecodable inline image: {}", e);
                                }
                                fill_rect(&mut canvas, rect, PLACEHOLDER_FILL);
                            }
                        },
                        Some(_) if options.remote_assets => {
                            // Left external by the inliner; degrade to a box
                            fill_rect(&mut canvas, rect, PLACEHOLDER_FILL);
                        }
                        _ => {}
                    }
                }
            }
        }

        let mut png_data = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_data)
            .write_image(canvas.as_raw(), width, height, image::ColorType::Rgba8)
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;

        if options.logging {
            log::debug!(
                "rasterized card at {}x{} from {} paint commands",
                width,
                height,
                cmds.len()
            );
        }

        Ok(RasterSurface {
            width,
            height,
            png_data,
        })
    }
}

fn scale_rect(x: i32, y: i32, w: u32, h: u32, s: f32) -> (i32, i32, u32, u32) {
    (
        (x as f32 * s).round() as i32,
        (y as f32 * s).round() as i32,
        (w as f32 * s).round() as u32,
        (h as f32 * s).round() as u32,
    )
}

fn fill_rect(canvas: &mut RgbaImage, rect: (i32, i32, u32, u32), rgba: [u8; 4]) {
    let (x, y, w, h) = rect;
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x.saturating_add(w as i32)).max(0) as u32;
    let y1 = (y.saturating_add(h as i32)).max(0) as u32;
    let px = Rgba(rgba);
    for yy in y0..y1.min(canvas.height()) {
        for xx in x0..x1.min(canvas.width()) {
            canvas.put_pixel(xx, yy, px);
        }
    }
}

fn decode_data_image(uri: &str) -> std::result::Result<RgbaImage, String> {
    let payload = uri
        .splitn(2, "base64,")
        .nth(1)
        .ok_or_else(|| "data URI is not base64".to_string())?;
    let bytes = STANDARD.decode(payload).map_err(|e| e.to_string())?;
    let img = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    Ok(img.to_rgba8())
}
