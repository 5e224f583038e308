use crate::texture::Texture;

use super::font::{for_each_text_pixel, text_width};
use super::{RenderSurface, Rgba, TextAlign, TextStyle};

const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// An RGBA8 pixel buffer that implements every drawing primitive in software.
/// Used both as the frame presented to the window and as cached layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: Rgba,
    rgba: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            background,
            rgba: background.repeat(width as usize * height as usize),
        }
    }

    /// A fully transparent layer meant to be composited with `draw_canvas`.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, TRANSPARENT)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn clear(&mut self) {
        let background = self.background;
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&background);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x as i32, y as i32)?;
        let bytes = &self.rgba[offset..offset + 4];
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Scales every colour channel by `brightness` (clamped to `0..=1`),
    /// leaving alpha untouched.
    pub fn dim(&mut self, brightness: f32) {
        let brightness = if brightness.is_finite() {
            brightness.clamp(0.0, 1.0)
        } else {
            1.0
        };
        for pixel in self.rgba.chunks_exact_mut(4) {
            for channel in &mut pixel[..3] {
                *channel = (*channel as f32 * brightness).round() as u8;
            }
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba, opacity: f32) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        blend_pixel(&mut self.rgba[offset..offset + 4], color, opacity);
    }
}

/// Source-over compositing in straight (non-premultiplied) alpha.
fn blend_pixel(dst: &mut [u8], src: Rgba, opacity: f32) {
    let src_alpha = src[3] as f32 / 255.0 * opacity;
    if src_alpha <= 0.0 {
        return;
    }
    if src_alpha >= 1.0 {
        dst.copy_from_slice(&src);
        return;
    }
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    for channel in 0..3 {
        let src_part = src[channel] as f32 * src_alpha;
        let dst_part = dst[channel] as f32 * dst_alpha * (1.0 - src_alpha);
        dst[channel] = ((src_part + dst_part) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round() as u8;
}

impl RenderSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_texture(&mut self, texture: &Texture, x: f32, y: f32, opacity: f32) {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if opacity <= 0.0 {
            return;
        }
        let left = x.floor() as i32;
        let top = y.floor() as i32;
        let rgba = texture.rgba();
        let width = texture.width() as usize;
        for ty in 0..texture.height() as usize {
            for tx in 0..width {
                let offset = (ty * width + tx) * 4;
                let Some(bytes) = rgba.get(offset..offset + 4) else {
                    return;
                };
                let color = [bytes[0], bytes[1], bytes[2], bytes[3]];
                self.blend(left + tx as i32, top + ty as i32, color, opacity);
            }
        }
    }

    fn draw_canvas(&mut self, layer: &Canvas) {
        let width = self.width.min(layer.width) as i32;
        let height = self.height.min(layer.height) as i32;
        for y in 0..height {
            for x in 0..width {
                if let Some(color) = layer.pixel(x as u32, y as u32) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(width).min(self.width as i32);
        let end_y = y.saturating_add(height).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        thickness: i32,
        color: Rgba,
    ) {
        let t = thickness.max(1).min(width / 2).min(height / 2).max(1);
        self.fill_rect(x, y, width, t, color);
        self.fill_rect(x, y + height - t, width, t, color);
        self.fill_rect(x, y + t, t, height - 2 * t, color);
        self.fill_rect(x + width - t, y + t, t, height - 2 * t, color);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle) {
        let scale = style.scale.max(1) as i32;
        let left = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - text_width(text, scale) / 2,
        };
        for_each_text_pixel(text, scale, |px, py| {
            self.blend(left + px, y + py, style.color, 1.0);
        });
    }

    fn capture(&self) -> Canvas {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Rgba = [192, 192, 192, 255];
    const RED: Rgba = [255, 0, 0, 255];

    #[test]
    fn new_canvas_is_filled_with_background_and_clear_restores_it() {
        let mut canvas = Canvas::new(4, 3, GREY);
        assert_eq!(canvas.pixel(3, 2), Some(GREY));

        canvas.fill_rect(0, 0, 4, 3, RED);
        assert_eq!(canvas.pixel(1, 1), Some(RED));

        canvas.clear();
        assert_eq!(canvas.pixel(1, 1), Some(GREY));
    }

    #[test]
    fn texture_draw_is_clipped_and_skips_transparent_pixels() {
        let mut rgba = RED.repeat(4);
        rgba[3] = 0; // top-left pixel transparent
        let texture = Texture::from_rgba("t", 2, 2, rgba).expect("texture");
        let mut canvas = Canvas::new(3, 3, GREY);

        canvas.draw_texture(&texture, 1.0, 1.0, 1.0);
        assert_eq!(canvas.pixel(1, 1), Some(GREY));
        assert_eq!(canvas.pixel(2, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(RED));

        canvas.draw_texture(&texture, -1.0, -1.0, 1.0);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
    }

    #[test]
    fn fractional_positions_truncate_toward_negative_infinity() {
        let texture = Texture::solid("dot", 1, 1, RED);
        let mut canvas = Canvas::new(3, 3, GREY);

        canvas.draw_texture(&texture, 1.9, 0.5, 1.0);
        assert_eq!(canvas.pixel(1, 0), Some(RED));
        assert_eq!(canvas.pixel(2, 0), Some(GREY));
    }

    #[test]
    fn opacity_blends_toward_destination() {
        let texture = Texture::solid("black", 1, 1, [0, 0, 0, 255]);
        let mut canvas = Canvas::new(1, 1, [200, 200, 200, 255]);

        canvas.draw_texture(&texture, 0.0, 0.0, 0.5);
        assert_eq!(canvas.pixel(0, 0), Some([100, 100, 100, 255]));

        canvas.draw_texture(&texture, 0.0, 0.0, 0.0);
        assert_eq!(canvas.pixel(0, 0), Some([100, 100, 100, 255]));
    }

    #[test]
    fn transparent_layer_composites_only_drawn_pixels() {
        let mut layer = Canvas::transparent(2, 1);
        layer.fill_rect(1, 0, 1, 1, RED);
        let mut canvas = Canvas::new(2, 1, GREY);

        canvas.draw_canvas(&layer);
        assert_eq!(canvas.pixel(0, 0), Some(GREY));
        assert_eq!(canvas.pixel(1, 0), Some(RED));
    }

    #[test]
    fn dim_scales_colour_but_not_alpha() {
        let mut canvas = Canvas::new(1, 1, [255, 90, 3, 255]);
        canvas.dim(1.0 / 3.0);
        assert_eq!(canvas.pixel(0, 0), Some([85, 30, 1, 255]));
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut canvas = Canvas::new(6, 6, GREY);
        canvas.stroke_rect(0, 0, 6, 6, 2, RED);

        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(1, 4), Some(RED));
        assert_eq!(canvas.pixel(5, 3), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(GREY));
        assert_eq!(canvas.pixel(3, 3), Some(GREY));
    }

    #[test]
    fn centered_text_straddles_anchor() {
        let style = TextStyle {
            scale: 1,
            color: RED,
            align: TextAlign::Center,
        };
        let mut canvas = Canvas::new(9, 5, GREY);
        // "I" is three pixels wide: columns 3..=5 around x = 4.
        canvas.draw_text("I", 4, 0, style);

        assert_eq!(canvas.pixel(3, 0), Some(RED));
        assert_eq!(canvas.pixel(5, 0), Some(RED));
        assert_eq!(canvas.pixel(4, 2), Some(RED));
        assert_eq!(canvas.pixel(3, 2), Some(GREY));
        assert_eq!(canvas.pixel(2, 0), Some(GREY));
    }

    #[test]
    fn drawing_off_surface_never_panics() {
        let texture = Texture::solid("big", 8, 8, RED);
        let mut canvas = Canvas::new(2, 2, GREY);
        canvas.draw_texture(&texture, -100.0, 500.0, 1.0);
        canvas.fill_rect(-5, -5, i32::MAX, i32::MAX, RED);
        canvas.draw_text("offscreen", 1000, -1000, TextStyle::default());
        assert_eq!(canvas.pixel(1, 1), Some(RED));
    }
}
