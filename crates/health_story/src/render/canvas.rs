use crate::error::{Result, StoryError};

use ab_glyph::{FontVec, PxScale};
use font_kit::{family_name::FamilyName, properties::Properties, source::SystemSource};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, imageops};
use imageproc::{
    drawing::{
        draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
        draw_text_mut, text_size,
    },
    point::Point,
    rect::Rect,
};
use log::warn;
use std::path::Path;

/// Raster canvas plus the font used for every label on it
pub struct Renderer {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
    font: Option<FontVec>,
}

impl Renderer {
    /// White canvas with the best available system font. Without one the
    /// canvas still renders shapes; text calls become no-ops.
    pub fn new(width: u32, height: u32) -> Self {
        let font = match load_system_font() {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("{e}; text labels will be omitted");
                None
            }
        };
        Self::with_font(width, height, font)
    }

    pub fn with_font(width: u32, height: u32, font: Option<FontVec>) -> Self {
        let image = ImageBuffer::from_pixel(width, height, Colors::WHITE);
        Self {
            image,
            width,
            height,
            font,
        }
    }

    /// Filled rectangle
    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round() as u32, height.round() as u32);
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    pub fn draw_rect_outline(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round() as u32, height.round() as u32);
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    /// Line segment; `thickness` in px, drawn as parallel 1px strokes
    pub fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Rgb<u8>,
    ) {
        let half = ((thickness.max(1.0) - 1.0) / 2.0).round() as i32;
        for dx in -half..=half {
            for dy in -half..=half {
                draw_line_segment_mut(
                    &mut self.image,
                    ((from.0 as f32) + dx as f32, (from.1 as f32) + dy as f32),
                    ((to.0 as f32) + dx as f32, (to.1 as f32) + dy as f32),
                    color,
                );
            }
        }
    }

    /// Fills a ring given in pixel coordinates (closing point optional)
    pub fn fill_polygon(&mut self, ring: &[(f64, f64)], color: Rgb<u8>) {
        let points = pixel_ring(ring);
        if points.len() >= 3 {
            draw_polygon_mut(&mut self.image, &points, color);
        }
    }

    /// Fills `exterior` while leaving the pixels inside each hole as they were
    pub fn fill_polygon_with_holes(
        &mut self,
        exterior: &[(f64, f64)],
        holes: &[Vec<(f64, f64)>],
        color: Rgb<u8>,
    ) {
        let patches: Vec<HolePatch> = holes
            .iter()
            .filter_map(|hole| HolePatch::capture(&self.image, hole))
            .collect();
        self.fill_polygon(exterior, color);
        for patch in &patches {
            patch.restore(&mut self.image);
        }
    }

    /// Outlines a ring given in pixel coordinates
    pub fn draw_ring(&mut self, ring: &[(f64, f64)], thickness: f64, color: Rgb<u8>) {
        if ring.len() < 2 {
            return;
        }
        for pair in ring.windows(2) {
            self.draw_line(pair[0], pair[1], thickness, color);
        }
        if let (Some(&first), Some(&last)) = (ring.first(), ring.last())
            && first != last
        {
            self.draw_line(last, first, thickness, color);
        }
    }

    /// Text with its top-left corner at (x, y)
    pub fn draw_text(&mut self, x: f64, y: f64, text: &str, font_size: f64, color: Rgb<u8>) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(font_size as f32);
        draw_text_mut(
            &mut self.image,
            color,
            x.round() as i32,
            y.round() as i32,
            scale,
            font,
            text,
        );
    }

    /// Bold face approximated by a one pixel double strike
    pub fn draw_text_bold(&mut self, x: f64, y: f64, text: &str, font_size: f64, color: Rgb<u8>) {
        self.draw_text(x, y, text, font_size, color);
        self.draw_text(x + 1.0, y, text, font_size, color);
    }

    /// Text anchored by its center
    pub fn draw_text_centered(
        &mut self,
        cx: f64,
        cy: f64,
        text: &str,
        font_size: f64,
        color: Rgb<u8>,
        bold: bool,
    ) {
        let (w, h) = self.text_size(text, font_size);
        let (x, y) = (cx - w / 2.0, cy - h / 2.0);
        if bold {
            self.draw_text_bold(x, y, text, font_size, color);
        } else {
            self.draw_text(x, y, text, font_size, color);
        }
    }

    /// Text anchored by its right edge, vertically centered on `cy`
    pub fn draw_text_right(&mut self, right: f64, cy: f64, text: &str, font_size: f64, color: Rgb<u8>) {
        let (w, h) = self.text_size(text, font_size);
        self.draw_text(right - w, cy - h / 2.0, text, font_size, color);
    }

    /// Text rotated a quarter turn counter-clockwise, centered on (cx, cy)
    pub fn draw_text_vertical(&mut self, cx: f64, cy: f64, text: &str, font_size: f64, color: Rgb<u8>) {
        let (w, h) = self.text_size(text, font_size);
        let Some(font) = &self.font else {
            return;
        };
        if w < 1.0 || h < 1.0 {
            return;
        }
        let mut strip: RgbImage =
            ImageBuffer::from_pixel(w.ceil() as u32 + 2, h.ceil() as u32 + 2, Colors::WHITE);
        draw_text_mut(
            &mut strip,
            color,
            1,
            1,
            PxScale::from(font_size as f32),
            font,
            text,
        );
        let rotated = imageops::rotate270(&strip);
        let x = (cx - rotated.width() as f64 / 2.0).round() as i64;
        let y = (cy - rotated.height() as f64 / 2.0).round() as i64;
        imageops::replace(&mut self.image, &rotated, x, y);
    }

    /// Rendered text extent in px, zero without a font
    pub fn text_size(&self, text: &str, font_size: f64) -> (f64, f64) {
        match &self.font {
            Some(font) => {
                let (w, h) = text_size(PxScale::from(font_size as f32), font, text);
                (w as f64, h as f64)
            }
            None => (0.0, 0.0),
        }
    }

    /// Copies `other` onto the canvas with its top-left at (x, y)
    pub fn blit(&mut self, other: &RgbImage, x: i64, y: i64) {
        imageops::replace(&mut self.image, other, x, y);
    }

    /// Saves the canvas, format chosen by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Rounds a ring to integer pixels, dropping repeated and closing points
fn pixel_ring(ring: &[(f64, f64)]) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.len());
    for &(x, y) in ring {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Pixels under a hole, saved before the surrounding fill
struct HolePatch {
    x: u32,
    y: u32,
    pixels: RgbImage,
    mask: GrayImage,
}

impl HolePatch {
    fn capture(image: &RgbImage, ring: &[(f64, f64)]) -> Option<Self> {
        let points = pixel_ring(ring);
        if points.len() < 3 || image.width() == 0 || image.height() == 0 {
            return None;
        }
        let clamp_x = |v: i32| v.clamp(0, image.width() as i32 - 1) as u32;
        let clamp_y = |v: i32| v.clamp(0, image.height() as i32 - 1) as u32;
        let x0 = clamp_x(points.iter().map(|p| p.x).min()?);
        let y0 = clamp_y(points.iter().map(|p| p.y).min()?);
        let x1 = clamp_x(points.iter().map(|p| p.x).max()?);
        let y1 = clamp_y(points.iter().map(|p| p.y).max()?);
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);

        let shifted: Vec<Point<i32>> = points
            .iter()
            .map(|p| Point::new(p.x - x0 as i32, p.y - y0 as i32))
            .collect();
        let mut mask = GrayImage::new(w, h);
        draw_polygon_mut(&mut mask, &shifted, Luma([255]));

        Some(Self {
            x: x0,
            y: y0,
            pixels: imageops::crop_imm(image, x0, y0, w, h).to_image(),
            mask,
        })
    }

    fn restore(&self, image: &mut RgbImage) {
        for (x, y, m) in self.mask.enumerate_pixels() {
            if m[0] > 0 {
                image.put_pixel(self.x + x, self.y + y, *self.pixels.get_pixel(x, y));
            }
        }
    }
}

/// Loads the first available sans-serif system font
fn load_system_font() -> Result<FontVec> {
    let source = SystemSource::new();

    let font_families = vec![
        FamilyName::Title("Arial".to_string()),
        FamilyName::Title("Helvetica".to_string()),
        FamilyName::Title("DejaVu Sans".to_string()),
        FamilyName::Title("Liberation Sans".to_string()),
        FamilyName::SansSerif,
    ];

    for family in font_families {
        if let Ok(handle) = source.select_best_match(&[family], &Properties::new())
            && let Ok(font_kit_font) = handle.load()
            && let Some(font_bytes) = font_kit_font.copy_font_data()
            && let Ok(font) = FontVec::try_from_vec(font_bytes.to_vec())
        {
            return Ok(font);
        }
    }

    Err(StoryError::Font("no usable system font found".to_string()))
}

/// Fixed colors shared by the charts and the poster
pub struct Colors;

impl Colors {
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([80, 80, 80]);
    pub const BAR_BLUE: Rgb<u8> = Rgb([31, 119, 180]); // matplotlib C0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ring_drops_closing_point() {
        let ring = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)];
        let points = pixel_ring(&ring);
        assert_eq!(points.len(), 3);
        assert_ne!(points.first(), points.last());
    }

    #[test]
    fn test_pixel_ring_collapses_duplicates() {
        let ring = [(0.1, 0.1), (0.2, 0.2), (5.0, 0.0), (5.0, 5.0), (0.0, 0.0)];
        let points = pixel_ring(&ring);
        assert_eq!(points, vec![Point::new(0, 0), Point::new(5, 0), Point::new(5, 5)]);
    }

    #[test]
    fn test_fill_polygon_without_font() {
        let mut renderer = Renderer::with_font(20, 20, None);
        renderer.fill_polygon(
            &[(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0), (2.0, 2.0)],
            Colors::BLACK,
        );
        assert_eq!(*renderer.image.get_pixel(10, 10), Colors::BLACK);
        assert_eq!(*renderer.image.get_pixel(0, 0), Colors::WHITE);
        // text is a no-op
        renderer.draw_text(0.0, 0.0, "10.0", 12.0, Colors::BLACK);
        assert_eq!(renderer.text_size("10.0", 12.0), (0.0, 0.0));
    }

    #[test]
    fn test_degenerate_polygon_ignored() {
        let mut renderer = Renderer::with_font(10, 10, None);
        renderer.fill_polygon(&[(1.0, 1.0), (1.2, 1.2), (1.0, 1.0)], Colors::BLACK);
        assert!(renderer.image.pixels().all(|p| *p == Colors::WHITE));
    }

    #[test]
    fn test_fill_keeps_hole_pixels() {
        let inner = Rgb([103, 0, 13]);
        let mut renderer = Renderer::with_font(40, 40, None);
        // an area already drawn where the next polygon has its hole
        renderer.fill_polygon(&[(15.0, 15.0), (25.0, 15.0), (25.0, 25.0), (15.0, 25.0)], inner);
        renderer.fill_polygon_with_holes(
            &[(2.0, 2.0), (38.0, 2.0), (38.0, 38.0), (2.0, 38.0)],
            &[vec![(12.0, 12.0), (28.0, 12.0), (28.0, 28.0), (12.0, 28.0)]],
            Colors::BAR_BLUE,
        );
        assert_eq!(*renderer.image.get_pixel(20, 20), inner);
        assert_eq!(*renderer.image.get_pixel(13, 13), Colors::WHITE);
        assert_eq!(*renderer.image.get_pixel(5, 5), Colors::BAR_BLUE);
        assert_eq!(*renderer.image.get_pixel(0, 0), Colors::WHITE);
    }

    #[test]
    fn test_hole_partly_off_canvas() {
        let mut renderer = Renderer::with_font(20, 20, None);
        renderer.fill_polygon_with_holes(
            &[(-10.0, -10.0), (30.0, -10.0), (30.0, 30.0), (-10.0, 30.0)],
            &[vec![(-5.0, -5.0), (10.0, -5.0), (10.0, 10.0), (-5.0, 10.0)]],
            Colors::BLACK,
        );
        assert_eq!(*renderer.image.get_pixel(3, 3), Colors::WHITE);
        assert_eq!(*renderer.image.get_pixel(15, 15), Colors::BLACK);
    }

    #[test]
    fn test_font_lookup_reports_instead_of_failing() {
        match load_system_font() {
            Ok(font) => {
                let renderer = Renderer::with_font(10, 10, Some(font));
                assert!(renderer.text_size("10.0", 12.0).0 > 0.0);
            }
            Err(e) => assert!(matches!(e, StoryError::Font(_))),
        }
    }
}
