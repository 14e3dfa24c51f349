use crate::annotations::detection::RawDetection;
use crate::error::ConfigError;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Box colors, picked per class so a label keeps its color across frames.
const PALETTE: [Rgb<u8>; 10] = [
    Rgb([255, 56, 56]),
    Rgb([255, 157, 151]),
    Rgb([255, 112, 31]),
    Rgb([255, 178, 29]),
    Rgb([207, 210, 49]),
    Rgb([72, 249, 10]),
    Rgb([26, 147, 52]),
    Rgb([0, 212, 187]),
    Rgb([44, 153, 168]),
    Rgb([0, 194, 255]),
];

const CAPTION_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const OVERLAY_TEXT: Rgb<u8> = Rgb([0, 255, 0]);

const BUNDLED_FONT_PATH: &str = "assets/fonts/DejaVuSans.ttf";
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// DejaVu Sans, compiled into the binary so captions and overlays never depend on the
/// host's fonts.
pub fn bundled_font() -> Result<FontArc, ConfigError> {
    FontArc::try_from_slice(BUNDLED_FONT)
        .map_err(|_| ConfigError::Font(PathBuf::from(BUNDLED_FONT_PATH)))
}

pub fn load_font(path: &Path) -> Result<FontArc, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| ConfigError::Font(path.to_path_buf()))
}

/// Stable color for a class label.
pub fn palette_color(category: &str) -> Rgb<u8> {
    // FNV-1a, so the mapping does not depend on the std hasher's seed.
    let hash = category.bytes().fold(0x811c9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x01000193)
    });
    PALETTE[hash as usize % PALETTE.len()]
}

/// Drawing parameters for detection boxes.
#[derive(Clone, Copy, Debug)]
pub struct BoxStyle {
    pub thickness: u32,
    pub label_scale: f32,
}

/// Box drawing shared by detector implementations.
#[derive(Clone)]
pub struct BoxRenderer {
    pub style: BoxStyle,
    pub font: FontArc,
}

impl BoxRenderer {
    pub fn new(style: BoxStyle, font: FontArc) -> Self {
        Self { style, font }
    }

    pub fn render(&self, image: &RgbImage, detections: &[RawDetection]) -> RgbImage {
        draw_labeled_boxes(image, detections, self.style, &self.font)
    }
}

/// Returns a copy of `image` with one hollow rectangle per detection and a
/// `"{label} {confidence}"` caption above each box. Empty boxes are skipped.
pub fn draw_labeled_boxes(
    image: &RgbImage,
    detections: &[RawDetection],
    style: BoxStyle,
    font: &FontArc,
) -> RgbImage {
    let mut canvas = image.clone();
    for detection in detections {
        let (x1, y1, x2, y2) = detection.annotation.as_pixel_xyxy();
        if x2 <= x1 || y2 <= y1 {
            continue;
        }
        let color = palette_color(detection.label());
        for inset in 0..style.thickness {
            let width = (x2 - x1).saturating_sub(2 * inset);
            let height = (y2 - y1).saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((x1 + inset) as i32, (y1 + inset) as i32).of_size(width, height);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
        let caption = format!("{} {:.2}", detection.label(), detection.confidence);
        draw_caption(&mut canvas, &caption, (x1, y1), color, style.label_scale, font);
    }
    canvas
}

/// Height of one line of text, from the top of the tallest glyph to the lowest descender.
fn line_height(font: &FontArc, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32
}

fn draw_caption(
    canvas: &mut RgbImage,
    caption: &str,
    box_corner: (u32, u32),
    background: Rgb<u8>,
    scale: f32,
    font: &FontArc,
) {
    let scale = PxScale::from(scale);
    let (text_width, _) = text_size(scale, font, caption);
    let text_height = line_height(font, scale);
    if text_width == 0 || text_height == 0 {
        return;
    }
    let (x, box_top) = (box_corner.0 as i32, box_corner.1 as i32);
    let strip_height = text_height as i32 + 2;
    // Above the box if it fits, inside it otherwise.
    let y = if box_top >= strip_height {
        box_top - strip_height
    } else {
        box_top
    };
    draw_filled_rect_mut(
        canvas,
        Rect::at(x, y).of_size(text_width + 2, text_height + 2),
        background,
    );
    draw_text_mut(canvas, CAPTION_TEXT, x + 1, y + 1, scale, font, caption);
}

/// Burns `text` into `canvas` in the overlay color. `anchor` is the left end of the
/// text's baseline; descenders fall below it.
pub fn draw_overlay_text(
    canvas: &mut RgbImage,
    text: &str,
    anchor: (i32, i32),
    scale: f32,
    font: &FontArc,
) {
    let scale = PxScale::from(scale);
    let ascent = font.as_scaled(scale).ascent().round() as i32;
    draw_text_mut(
        canvas,
        OVERLAY_TEXT,
        anchor.0,
        anchor.1 - ascent,
        scale,
        font,
        text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn detection(label: &str, xyxy: (f32, f32, f32, f32)) -> RawDetection {
        RawDetection {
            annotation: BoundingBox::new(xyxy.0, xyxy.1, xyxy.2, xyxy.3, label.to_string())
                .unwrap(),
            confidence: 0.8,
        }
    }

    fn font() -> FontArc {
        bundled_font().unwrap()
    }

    /// Pixels that are not black, as (x, y).
    fn lit_pixels(image: &RgbImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != BLACK)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn palette_is_stable_per_label() {
        assert_eq!(palette_color("truck"), palette_color("truck"));
        assert!(PALETTE.contains(&palette_color("bottle")));
    }

    #[test]
    fn boxes_are_drawn_on_a_copy() {
        let image = RgbImage::new(60, 60);
        let style = BoxStyle {
            thickness: 1,
            label_scale: 10.0,
        };
        let detections = [detection("truck", (4.0, 30.0, 24.0, 50.0))];
        let boxed = draw_labeled_boxes(&image, &detections, style, &font());
        let color = palette_color("truck");
        assert_eq!(boxed.get_pixel(4, 30), &color);
        assert_eq!(boxed.get_pixel(23, 40), &color);
        assert_eq!(boxed.get_pixel(14, 40), &BLACK);
        assert_eq!(image.get_pixel(4, 30), &BLACK);
    }

    #[test]
    fn caption_strip_sits_above_the_box() {
        let image = RgbImage::new(80, 80);
        let style = BoxStyle {
            thickness: 1,
            label_scale: 12.0,
        };
        let detections = [detection("truck", (10.0, 40.0, 70.0, 70.0))];
        let boxed = draw_labeled_boxes(&image, &detections, style, &font());
        let color = palette_color("truck");
        let strip_top = 40 - line_height(&font(), PxScale::from(12.0)) - 2;

        assert_eq!(boxed.get_pixel(10, 39), &color);
        assert_eq!(boxed.get_pixel(10, strip_top), &color);
        assert_eq!(boxed.get_pixel(10, strip_top - 1), &BLACK);
        // Caption text is drawn over the strip.
        assert!(
            (strip_top..40)
                .flat_map(|y| (11..70).map(move |x| (x, y)))
                .any(|(x, y)| boxed.get_pixel(x, y) != &color && boxed.get_pixel(x, y) != &BLACK)
        );
        assert_eq!(boxed.get_pixel(40, 55), &BLACK);
    }

    #[test]
    fn caption_moves_inside_boxes_at_the_top_edge() {
        let image = RgbImage::new(80, 80);
        let style = BoxStyle {
            thickness: 1,
            label_scale: 12.0,
        };
        let detections = [detection("truck", (10.0, 0.0, 70.0, 60.0))];
        let boxed = draw_labeled_boxes(&image, &detections, style, &font());
        let color = palette_color("truck");
        assert_eq!(boxed.get_pixel(10, 5), &color);
        assert_eq!(boxed.get_pixel(40, 50), &BLACK);
    }

    #[test]
    fn degenerate_boxes_are_skipped() {
        let image = RgbImage::new(10, 10);
        let style = BoxStyle {
            thickness: 3,
            label_scale: 12.0,
        };
        let detections = [detection("car", (4.0, 4.0, 4.0, 9.0))];
        let boxed = draw_labeled_boxes(&image, &detections, style, &font());
        assert_eq!(boxed, image);
    }

    #[test]
    fn overlay_sits_on_its_baseline() {
        let mut image = RgbImage::new(640, 100);
        draw_overlay_text(
            &mut image,
            "ANALYSIS: 14% FULL | VOL: 2.8m3",
            (20, 50),
            32.0,
            &font(),
        );
        let lit = lit_pixels(&image);
        assert!(lit.len() > 100);
        assert!(lit.iter().all(|&(x, y)| x >= 18 && (18..60).contains(&y)));
        // Capital letters rest on the baseline.
        assert!(lit.iter().any(|&(_, y)| (45..=50).contains(&y)));
        assert!(lit.iter().all(|&(x, y)| {
            let [red, _, blue] = image.get_pixel(x, y).0;
            red == 0 && blue == 0
        }));
    }

    #[test]
    fn overlay_is_clipped_to_small_frames() {
        let mut image = RgbImage::new(30, 20);
        draw_overlay_text(&mut image, "ANALYSIS: 0% FULL", (20, 50), 32.0, &font());
        assert_eq!(image.dimensions(), (30, 20));
    }

    #[test]
    fn unreadable_font_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(load_font(file.path()), Err(ConfigError::Font(_))));
        assert!(matches!(
            load_font(Path::new("/nonexistent/font.ttf")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn bundled_font_file_loads_from_disk() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_FONT_PATH);
        let font = load_font(&path).unwrap();
        assert!(line_height(&font, PxScale::from(32.0)) >= 30);
    }
}
