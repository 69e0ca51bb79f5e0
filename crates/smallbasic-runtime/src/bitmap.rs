//! RGBA bitmaps: PNG decoding, rotation and colour-matrix compositing.

use crate::color::Color;
use crate::error::{RuntimeError, RuntimeResult};

#[derive(Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    /// Row-major RGBA, four bytes per pixel
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// A bitmap filled with `color`
    pub fn new(width: u32, height: u32, color: Color) -> Self {
        let pixels = color
            .to_rgba()
            .repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> RuntimeResult<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(RuntimeError::image(format!(
                "{} bytes cannot hold a {width}x{height} RGBA image",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * 4;
            self.pixels[i..i + 4].copy_from_slice(&color.to_rgba());
        }
    }

    /// Decodes a PNG file into RGBA
    pub fn decode_png(bytes: &[u8]) -> RuntimeResult<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let pixels = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(RuntimeError::image("palette was not expanded"));
            }
        };
        Self::from_rgba(info.width, info.height, pixels)
    }

    pub fn encode_png(&self) -> RuntimeResult<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// Bilinear sample at continuous pixel coordinates; transparent outside
    fn sample(&self, x: f64, y: f64) -> [f64; 4] {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let mut acc = [0.0; 4];
        for (dx, dy, weight) in [
            (0.0, 0.0, (1.0 - fx) * (1.0 - fy)),
            (1.0, 0.0, fx * (1.0 - fy)),
            (0.0, 1.0, (1.0 - fx) * fy),
            (1.0, 1.0, fx * fy),
        ] {
            if weight <= 0.0 {
                continue;
            }
            let (sx, sy) = (x0 + dx, y0 + dy);
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            if let Some(c) = self.pixel(sx as u32, sy as u32) {
                for (slot, v) in acc.iter_mut().zip(c.to_rgba()) {
                    *slot += v as f64 * weight;
                }
            }
        }
        acc
    }

    /// Rotates clockwise by `degrees` about the centre, keeping the canvas size.
    ///
    /// Corners that rotate out of the canvas are lost and uncovered areas
    /// become transparent.
    pub fn rotated(&self, degrees: f64) -> Bitmap {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let mut out = Bitmap {
            width: self.width,
            height: self.height,
            pixels: vec![0; self.pixels.len()],
        };
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let src_x = cos * dx + sin * dy + cx - 0.5;
                let src_y = -sin * dx + cos * dy + cy - 0.5;
                let [r, g, b, a] = self.sample(src_x, src_y);
                let round = |v: f64| v.round().clamp(0.0, 255.0) as u8;
                out.set_pixel(
                    x,
                    y,
                    Color {
                        r: round(r),
                        g: round(g),
                        b: round(b),
                        a: round(a),
                    },
                );
            }
        }
        out
    }

    /// A copy with every pixel passed through `matrix`
    pub fn transformed(&self, matrix: &ColorMatrix) -> Bitmap {
        let pixels = self
            .pixels
            .chunks_exact(4)
            .flat_map(|p| matrix.apply([p[0], p[1], p[2], p[3]]))
            .collect();
        Bitmap {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Scales alpha by `opacity` (0.0 to 1.0)
    pub fn with_opacity(&self, opacity: f64) -> Bitmap {
        self.transformed(&ColorMatrix::opacity(opacity))
    }
}

/// A 5x5 matrix acting on `[r, g, b, a, 1]` with components scaled to 0..1
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrix(pub [[f64; 5]; 5]);

impl ColorMatrix {
    pub fn identity() -> Self {
        let mut m = [[0.0; 5]; 5];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        ColorMatrix(m)
    }

    pub fn opacity(opacity: f64) -> Self {
        let mut matrix = Self::identity();
        matrix.0[3][3] = opacity.clamp(0.0, 1.0);
        matrix
    }

    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        let input = [
            rgba[0] as f64 / 255.0,
            rgba[1] as f64 / 255.0,
            rgba[2] as f64 / 255.0,
            rgba[3] as f64 / 255.0,
            1.0,
        ];
        let mut out = [0u8; 4];
        for (channel, slot) in out.iter_mut().enumerate() {
            let v: f64 = input
                .iter()
                .zip(&self.0)
                .map(|(x, row)| x * row[channel])
                .sum();
            *slot = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> Bitmap {
        let mut bitmap = Bitmap::new(3, 3, Color::WHITE);
        bitmap.set_pixel(2, 1, Color::rgb(255, 0, 0));
        bitmap
    }

    #[test]
    fn test_png_round_trip() {
        let bitmap = marker();
        let bytes = bitmap.encode_png().unwrap();
        assert_eq!(Bitmap::decode_png(&bytes).unwrap(), bitmap);
    }

    #[test]
    fn test_decode_garbage_is_image_error() {
        let err = Bitmap::decode_png(b"not a png").unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::Image(_)));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = marker().rotated(90.0);
        assert_eq!(rotated.pixel(1, 2), Some(Color::rgb(255, 0, 0)));
        assert_eq!(rotated.pixel(1, 1), Some(Color::WHITE));
    }

    #[test]
    fn test_full_turn_is_identity() {
        let bitmap = marker();
        assert_eq!(bitmap.rotated(360.0), bitmap);
    }

    #[test]
    fn test_opacity() {
        let bitmap = marker();
        assert!(bitmap.with_opacity(0.0).pixels().chunks(4).all(|p| p[3] == 0));
        assert_eq!(bitmap.with_opacity(0.5).pixel(2, 1).unwrap().a, 128);
        assert_eq!(bitmap.with_opacity(1.0), bitmap);
        assert_eq!(ColorMatrix::identity().apply([1, 2, 3, 4]), [1, 2, 3, 4]);
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Bitmap::from_rgba(2, 2, vec![0; 15]).is_err());
    }
}
