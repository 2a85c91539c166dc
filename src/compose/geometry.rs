//! Percent-anchor geometry shared by image and text layers.

use crate::foundation::core::{Canvas, Point, Rect};

/// Map a percent-of-canvas anchor to pixel coordinates.
pub fn anchor_point(x_pct: f64, y_pct: f64, canvas: Canvas) -> Point {
    Point::new(
        x_pct / 100.0 * f64::from(canvas.width),
        y_pct / 100.0 * f64::from(canvas.height),
    )
}

/// Natural size scaled by a percentage.
pub fn scaled_size(natural_width: u32, natural_height: u32, scale_pct: f64) -> (f64, f64) {
    let k = scale_pct / 100.0;
    (f64::from(natural_width) * k, f64::from(natural_height) * k)
}

/// Rectangle of size `w`×`h` whose center sits on `center`.
pub fn centered_rect(center: Point, w: f64, h: f64) -> Rect {
    Rect::new(
        center.x - w / 2.0,
        center.y - h / 2.0,
        center.x + w / 2.0,
        center.y + h / 2.0,
    )
}

/// Rectangle of `content_w`×`content_h` at `top_left`, grown by `padding` on every side.
pub fn padded_rect(top_left: Point, content_w: f64, content_h: f64, padding: f64) -> Rect {
    Rect::new(
        top_left.x - padding,
        top_left.y - padding,
        top_left.x + content_w + padding,
        top_left.y + content_h + padding,
    )
}
