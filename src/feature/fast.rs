//! FAST-9 segment-test corner detection.
//!
//! A pixel is a corner when at least 9 contiguous pixels on the radius-3
//! Bresenham circle are all brighter or all darker than the center by the
//! threshold. A 4-point cardinal pre-check rejects most candidates before
//! the full segment test runs.

use crate::image::ImageView;

/// Offsets of the 16-pixel Bresenham circle of radius 3, clockwise from north.
const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const ARC_LENGTH: usize = 9;
const BORDER: usize = 3;

/// A corner candidate in view-local pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Corner {
    pub x: u32,
    pub y: u32,
    pub response: f32,
}

#[inline]
fn px(view: &ImageView<'_>, x: i32, y: i32) -> u8 {
    view.as_slice()[y as usize * view.stride() + x as usize]
}

/// Detects FAST-9 corners over the interior of the view.
pub(crate) fn detect(view: ImageView<'_>, threshold: u8) -> Vec<Corner> {
    let width = view.width();
    let height = view.height();
    if width <= 2 * BORDER || height <= 2 * BORDER {
        return Vec::new();
    }

    let mut corners = Vec::new();
    for y in BORDER..height - BORDER {
        for x in BORDER..width - BORDER {
            let center = px(&view, x as i32, y as i32);
            if !pre_check(&view, x as i32, y as i32, center, threshold) {
                continue;
            }
            if is_corner(&view, x as i32, y as i32, center, threshold) {
                corners.push(Corner {
                    x: x as u32,
                    y: y as u32,
                    response: corner_response(&view, x as i32, y as i32, center),
                });
            }
        }
    }
    corners
}

/// Cardinal-point rejection: any 9-long arc covers at least 2 of the 4
/// compass pixels, so fewer than 2 on the same side rules the pixel out.
fn pre_check(view: &ImageView<'_>, x: i32, y: i32, center: u8, threshold: u8) -> bool {
    let bright = center.saturating_add(threshold);
    let dark = center.saturating_sub(threshold);
    let cardinal = [
        px(view, x, y - 3),
        px(view, x + 3, y),
        px(view, x, y + 3),
        px(view, x - 3, y),
    ];
    let brighter = cardinal.iter().filter(|&&p| p > bright).count();
    let darker = cardinal.iter().filter(|&&p| p < dark).count();
    brighter >= 2 || darker >= 2
}

fn is_corner(view: &ImageView<'_>, x: i32, y: i32, center: u8, threshold: u8) -> bool {
    let bright = center.saturating_add(threshold);
    let dark = center.saturating_sub(threshold);

    let mut bright_run = 0usize;
    let mut dark_run = 0usize;
    let mut max_bright = 0usize;
    let mut max_dark = 0usize;

    // Walk the circle twice so a run crossing the seam is still contiguous.
    for i in 0..CIRCLE.len() * 2 {
        let (dx, dy) = CIRCLE[i % CIRCLE.len()];
        let p = px(view, x + dx, y + dy);
        if p > bright {
            bright_run += 1;
            dark_run = 0;
            max_bright = max_bright.max(bright_run);
        } else if p < dark {
            dark_run += 1;
            bright_run = 0;
            max_dark = max_dark.max(dark_run);
        } else {
            bright_run = 0;
            dark_run = 0;
        }
    }
    max_bright >= ARC_LENGTH || max_dark >= ARC_LENGTH
}

/// Sum of absolute circle-to-center differences; used to rank corners.
fn corner_response(view: &ImageView<'_>, x: i32, y: i32, center: u8) -> f32 {
    CIRCLE
        .iter()
        .map(|&(dx, dy)| (px(view, x + dx, y + dy) as i32 - center as i32).unsigned_abs())
        .sum::<u32>() as f32
}

/// Grid non-maximum suppression: keeps the strongest corner per occupied
/// `radius`-sized cell neighborhood, capped at `max_corners`.
pub(crate) fn suppress(mut corners: Vec<Corner>, radius: f32, max_corners: usize) -> Vec<Corner> {
    if corners.is_empty() {
        return corners;
    }

    corners.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.y, a.x).cmp(&(b.y, b.x)))
    });

    let mut occupied = std::collections::HashSet::new();
    let mut kept = Vec::new();
    for corner in corners {
        let cell_x = (corner.x as f32 / radius) as i32;
        let cell_y = (corner.y as f32 / radius) as i32;
        let mut free = true;
        'scan: for dy in -1..=1 {
            for dx in -1..=1 {
                if occupied.contains(&(cell_x + dx, cell_y + dy)) {
                    free = false;
                    break 'scan;
                }
            }
        }
        if free {
            occupied.insert((cell_x, cell_y));
            kept.push(corner);
            if kept.len() >= max_corners {
                break;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bright_square(size: usize, x0: usize, y0: usize, side: usize) -> Vec<u8> {
        let mut data = vec![30u8; size * size];
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                data[y * size + x] = 220;
            }
        }
        data
    }

    #[test]
    fn flat_image_has_no_corners() {
        let data = vec![128u8; 20 * 20];
        let view = ImageView::from_slice(&data, 20, 20).unwrap();
        assert!(detect(view, 20).is_empty());
    }

    #[test]
    fn square_corners_are_detected() {
        let data = bright_square(24, 8, 8, 8);
        let view = ImageView::from_slice(&data, 24, 24).unwrap();
        let corners = detect(view, 20);
        assert!(!corners.is_empty());
        // The square's top-left corner should be near (8, 8).
        assert!(corners
            .iter()
            .any(|c| (c.x as i32 - 8).abs() <= 1 && (c.y as i32 - 8).abs() <= 1));
    }

    #[test]
    fn suppression_caps_and_spreads_corners() {
        let corners = vec![
            Corner { x: 10, y: 10, response: 5.0 },
            Corner { x: 11, y: 10, response: 9.0 },
            Corner { x: 40, y: 40, response: 1.0 },
        ];
        let kept = suppress(corners, 5.0, 10);
        assert_eq!(kept.len(), 2);
        assert_eq!((kept[0].x, kept[0].y), (11, 10));
        assert_eq!((kept[1].x, kept[1].y), (40, 40));

        let corners = vec![
            Corner { x: 10, y: 10, response: 5.0 },
            Corner { x: 40, y: 40, response: 4.0 },
        ];
        assert_eq!(suppress(corners, 5.0, 1).len(), 1);
    }
}
