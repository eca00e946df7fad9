//! Rectangle detection in screenshots

use image::RgbImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::edges::canny;
use imageproc::point::Point;
use tracing::debug;

use crate::element::Bounds;
use crate::error::Result;

const MIN_SIDE: u32 = 3;

/// Finds rectangles whose size falls inside inclusive ranges
pub trait ShapeDetector: Send + Sync {
    fn detect(
        &self,
        image: &RgbImage,
        width_range: (u32, u32),
        height_range: (u32, u32),
    ) -> Result<Vec<Bounds>>;
}

/// Bounding boxes of outer edge contours
#[derive(Debug, Clone)]
pub struct ContourShapeDetector {
    low_threshold: f32,
    high_threshold: f32,
}

impl ContourShapeDetector {
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }
}

impl Default for ContourShapeDetector {
    fn default() -> Self {
        Self::new(50.0, 150.0)
    }
}

impl ShapeDetector for ContourShapeDetector {
    fn detect(
        &self,
        image: &RgbImage,
        width_range: (u32, u32),
        height_range: (u32, u32),
    ) -> Result<Vec<Bounds>> {
        // edge detection needs a pixel on every side of the interior
        if image.width() < MIN_SIDE || image.height() < MIN_SIDE {
            debug!("Image {:?} too small for shape detection", image.dimensions());
            return Ok(Vec::new());
        }

        let gray = image::imageops::grayscale(image);
        let edges = canny(&gray, self.low_threshold, self.high_threshold);

        let mut found: Vec<Bounds> = find_contours::<i32>(&edges)
            .iter()
            .filter(|contour| matches!(contour.border_type, BorderType::Outer))
            .filter_map(|contour| bounding_box(&contour.points))
            .filter(|b| in_range(b.width(), width_range) && in_range(b.height(), height_range))
            .collect();

        found.sort_by_key(|b| (b.y1(), b.x1(), b.y2(), b.x2()));
        found.dedup();

        debug!(
            "Shape detection found {} rectangles (width {:?}, height {:?})",
            found.len(),
            width_range,
            height_range
        );
        Ok(found)
    }
}

/// Smallest rectangle covering every point; each point is one pixel wide
fn bounding_box(points: &[Point<i32>]) -> Option<Bounds> {
    let first = points.first()?;
    let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
    for p in points {
        x1 = x1.min(p.x);
        y1 = y1.min(p.y);
        x2 = x2.max(p.x);
        y2 = y2.max(p.y);
    }
    Some(Bounds::new(x1, y1, x2 + 1, y2 + 1))
}

fn in_range(value: u32, (min, max): (u32, u32)) -> bool {
    (min..=max).contains(&value)
}
