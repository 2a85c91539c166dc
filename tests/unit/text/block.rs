use super::*;
use crate::text::wrap::ApproxMeasure;

fn unit() -> ApproxMeasure {
    ApproxMeasure { em_advance: 1.0 }
}

fn layer(content: &str) -> TextLayer {
    let mut t = TextLayer::new(LayerId(1));
    t.content = content.to_string();
    t.font_size_px = 10.0;
    t.max_width_px = 1_000.0;
    t.x = 10.0;
    t.y = 20.0;
    t
}

#[test]
fn origin_is_the_top_left_anchor() {
    let block = layout_text_block(
        &layer("hi"),
        Canvas::new(200, 100),
        &ComposeSettings::default(),
        &mut unit(),
    )
    .unwrap();
    assert_eq!(block.origin, Point::new(20.0, 20.0));
    assert_eq!(block.line_origin(0), Point::new(20.0, 20.0));
    assert_eq!(block.line_origin(2), Point::new(20.0, 44.0));
}

#[test]
fn background_box_wraps_lines_with_padding() {
    let mut t = layer("abcd\nab");
    t.background_opacity = 50.0;
    let block = layout_text_block(
        &t,
        Canvas::new(200, 100),
        &ComposeSettings::default(),
        &mut unit(),
    )
    .unwrap();

    // widest line "abcd " = 50px, two lines of 12px, 5px padding.
    let bg = block.background.unwrap();
    assert_eq!(bg.rect.x0, 15.0);
    assert_eq!(bg.rect.y0, 15.0);
    assert_eq!(bg.rect.width(), 60.0);
    assert_eq!(bg.rect.height(), 34.0);
    assert_eq!((bg.color.r, bg.color.g, bg.color.b, bg.color.a), (0, 0, 0, 128));
}

#[test]
fn zero_background_opacity_means_no_box() {
    let block = layout_text_block(
        &layer("x"),
        Canvas::new(10, 10),
        &ComposeSettings::default(),
        &mut unit(),
    )
    .unwrap();
    assert!(block.background.is_none());
}

#[test]
fn empty_content_draws_nothing_even_with_a_box() {
    let mut t = layer("");
    t.background_opacity = 80.0;
    assert!(
        layout_text_block(
            &t,
            Canvas::new(10, 10),
            &ComposeSettings::default(),
            &mut unit()
        )
        .is_none()
    );
}

#[test]
fn pathological_values_skip_the_layer() {
    let settings = ComposeSettings::default();
    let canvas = Canvas::new(10, 10);

    let mut t = layer("x");
    t.font_size_px = -3.0;
    assert!(layout_text_block(&t, canvas, &settings, &mut unit()).is_none());

    let mut t = layer("x");
    t.x = f64::INFINITY;
    assert!(layout_text_block(&t, canvas, &settings, &mut unit()).is_none());
}

#[test]
fn bad_color_falls_back_to_white() {
    let mut t = layer("x");
    t.color_hex = "tomato".to_string();
    let block = layout_text_block(
        &t,
        Canvas::new(10, 10),
        &ComposeSettings::default(),
        &mut unit(),
    )
    .unwrap();
    assert_eq!(block.color, Rgba8::WHITE);
}
