use embedded_graphics::Pixel;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::foundation::core::{BYTES_PER_PIXEL, SignGeometry};

/// Off-screen BGRA drawing surface.
///
/// The pixel buffer is allocated once and reused for every frame; the
/// exported layout is W·H·4 bytes in canvas scan order, matching what the
/// transport expects to pop off the queue. Drawing goes through
/// [`embedded_graphics`] primitives; every pixel write is blended with the
/// current paint alpha.
#[derive(Debug, Clone)]
pub struct Canvas {
    geometry: SignGeometry,
    data: Vec<u8>,
    paint_alpha: f64,
}

impl Canvas {
    /// Allocate a canvas for the given sign geometry.
    pub fn new(geometry: SignGeometry) -> Self {
        Self {
            geometry,
            data: vec![0; geometry.frame_len()],
            paint_alpha: 1.0,
        }
    }

    /// Canvas geometry.
    pub fn geometry(&self) -> SignGeometry {
        self.geometry
    }

    /// Reset every pixel to opaque black.
    pub fn clear(&mut self) {
        for (i, byte) in self.data.iter_mut().enumerate() {
            *byte = if i % BYTES_PER_PIXEL == 3 { 0xff } else { 0 };
        }
    }

    /// The raw BGRA pixel buffer (length W·H·4).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Run `f` with the paint alpha set to `alpha`, restoring the previous
    /// value afterwards.
    pub(crate) fn with_alpha<R>(&mut self, alpha: f64, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.paint_alpha;
        self.paint_alpha = alpha.clamp(0.0, 1.0);
        let out = f(self);
        self.paint_alpha = saved;
        out
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgb888) {
        if x < 0 || y < 0 || x >= self.geometry.width as i32 || y >= self.geometry.height as i32 {
            return;
        }
        let alpha = self.paint_alpha;
        if alpha <= 0.0 {
            return;
        }

        let idx = (y as usize * self.geometry.width as usize + x as usize) * BYTES_PER_PIXEL;
        let blend = |src: u8, dst: u8| -> u8 {
            (f64::from(src) * alpha + f64::from(dst) * (1.0 - alpha)).round() as u8
        };
        self.data[idx] = blend(color.b(), self.data[idx]);
        self.data[idx + 1] = blend(color.g(), self.data[idx + 1]);
        self.data[idx + 2] = blend(color.r(), self.data[idx + 2]);
        self.data[idx + 3] = 0xff;
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.geometry.width, self.geometry.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.blend_pixel(point.x, point.y, color);
        }
        Ok(())
    }
}
