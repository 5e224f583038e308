mod canvas;
mod font;

use crate::texture::Texture;

pub use canvas::Canvas;

pub type Rgba = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Each font pixel is drawn as a `scale`×`scale` block.
    pub scale: u32,
    pub color: Rgba,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: 2,
            color: [255, 255, 255, 255],
            align: TextAlign::Left,
        }
    }
}

/// The drawing primitives a scene needs. Coordinates are in surface pixels
/// with the origin at the top-left corner; everything is clipped.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    /// Draws `texture` with its top-left corner at `(x, y)`, truncated to whole
    /// pixels. `opacity` scales the texture's own alpha.
    fn draw_texture(&mut self, texture: &Texture, x: f32, y: f32, opacity: f32);

    /// Composites a previously drawn layer over the whole surface.
    fn draw_canvas(&mut self, layer: &Canvas);

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba);

    fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        thickness: i32,
        color: Rgba,
    );

    /// `x` is the left edge for `TextAlign::Left` and the centre for
    /// `TextAlign::Center`; `y` is the top of the glyph row.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle);

    /// Copies the pixels drawn so far.
    fn capture(&self) -> Canvas;
}
