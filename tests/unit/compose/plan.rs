use super::*;
use crate::{
    layers::model::{ImageKind, LayerField, LayerKind},
    text::wrap::ApproxMeasure,
};

fn img(w: u32, h: u32) -> Arc<DecodedImage> {
    Arc::new(DecodedImage::solid(w, h, [200, 100, 50, 255]))
}

fn unit() -> ApproxMeasure {
    ApproxMeasure { em_advance: 1.0 }
}

fn small_canvas_settings(w: u32, h: u32) -> ComposeSettings {
    ComposeSettings {
        min_canvas: Canvas::new(w, h),
        ..ComposeSettings::default()
    }
}

fn with_loaded_background(w: u32, h: u32) -> (LayerStore, LayerId) {
    let mut store = LayerStore::starter();
    let id = store.backgrounds()[0].id;
    store.mark_loaded(ImageKind::Background, id, img(w, h), "bg.png");
    (store, id)
}

#[test]
fn no_loaded_background_yields_placeholder_only() {
    let mut store = LayerStore::starter();
    store.add(LayerKind::Text);
    let ov = store.add(LayerKind::Overlay);
    store.mark_loaded(ImageKind::Overlay, ov, img(10, 10), "ov.png");

    let settings = ComposeSettings::default();
    let plan = compile_plan(&store, &mut unit(), &settings);
    assert!(plan.is_placeholder());
    assert_eq!(plan.canvas, Canvas::new(800, 600));
    assert!(
        matches!(plan.ops[0], DrawOp::Fill { color } if color == settings.placeholder())
    );
}

#[test]
fn canvas_grows_to_largest_loaded_background() {
    let (store, _) = with_loaded_background(1000, 1200);
    let plan = compile_plan(&store, &mut unit(), &ComposeSettings::default());
    assert_eq!(plan.canvas, Canvas::new(1000, 1200));
}

#[test]
fn small_loaded_and_big_unloaded_backgrounds_keep_the_floor() {
    let (mut store, _) = with_loaded_background(500, 400);
    let unloaded = store.add(LayerKind::Background);
    // Natural size recorded but never loaded: must not count.
    let mut layers = store.backgrounds().to_vec();
    if let Some(l) = layers.iter_mut().find(|l| l.id == unloaded) {
        l.natural_width = 1000;
        l.natural_height = 1200;
    }
    store.replace_layers(layers, vec![], vec![]);

    assert_eq!(
        canvas_size(&store, Canvas::new(800, 600)),
        Canvas::new(800, 600)
    );
}

#[test]
fn image_anchor_is_the_center() {
    let (store, id) = with_loaded_background(100, 100);
    let plan = compile_plan(&store, &mut unit(), &small_canvas_settings(200, 200));

    let draws: Vec<_> = plan.image_ops().collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].layer, id);
    assert_eq!(draws[0].dest, Rect::new(50.0, 50.0, 150.0, 150.0));
    assert_eq!(draws[0].opacity, 1.0);
}

#[test]
fn bands_paint_backgrounds_then_overlays_then_text() {
    let (mut store, bg) = with_loaded_background(10, 10);
    let ov = store.add(LayerKind::Overlay);
    store.mark_loaded(ImageKind::Overlay, ov, img(4, 4), "ov.png");
    let tx = store.add(LayerKind::Text);
    store.update(LayerKind::Text, tx, LayerField::BackgroundOpacity(40.0));
    // Added after the text, still painted before it.
    let bg2 = store.add(LayerKind::Background);
    store.mark_loaded(ImageKind::Background, bg2, img(10, 10), "bg2.png");

    let plan = compile_plan(&store, &mut unit(), &small_canvas_settings(20, 20));
    let tags: Vec<String> = plan
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::Fill { .. } => "fill".to_string(),
            DrawOp::Image(d) => format!("{:?}:{}", d.band, d.layer),
            DrawOp::Rect { .. } => "box".to_string(),
            DrawOp::TextLine(t) => format!("text:{}", t.layer),
        })
        .collect();
    assert_eq!(
        tags,
        vec![
            format!("Background:{bg}"),
            format!("Background:{bg2}"),
            format!("Overlay:{ov}"),
            "box".to_string(),
            format!("text:{tx}"),
        ]
    );
}

#[test]
fn overlay_defaults_center_at_half_scale() {
    let (mut store, _) = with_loaded_background(400, 400);
    let ov = store.add(LayerKind::Overlay);
    store.mark_loaded(ImageKind::Overlay, ov, img(100, 60), "logo.png");

    let plan = compile_plan(&store, &mut unit(), &small_canvas_settings(400, 400));
    let d = plan.image_ops().find(|d| d.layer == ov).unwrap();
    assert_eq!(d.dest, Rect::new(175.0, 185.0, 225.0, 215.0));
}

#[test]
fn opacity_is_clamped_and_defaults_when_not_finite() {
    let (mut store, id) = with_loaded_background(10, 10);
    let settings = small_canvas_settings(10, 10);

    store.update(LayerKind::Background, id, LayerField::Opacity(250.0));
    let plan = compile_plan(&store, &mut unit(), &settings);
    assert_eq!(plan.image_ops().next().unwrap().opacity, 1.0);

    store.update(LayerKind::Background, id, LayerField::Opacity(f64::NAN));
    let plan = compile_plan(&store, &mut unit(), &settings);
    assert_eq!(plan.image_ops().next().unwrap().opacity, 1.0);

    store.update(LayerKind::Background, id, LayerField::Opacity(-1.0));
    let plan = compile_plan(&store, &mut unit(), &settings);
    assert_eq!(plan.image_ops().next().unwrap().opacity, 0.0);
}

#[test]
fn negative_scale_skips_the_layer_without_failing() {
    let (mut store, id) = with_loaded_background(10, 10);
    store.update(LayerKind::Background, id, LayerField::Scale(-20.0));
    let plan = compile_plan(&store, &mut unit(), &small_canvas_settings(10, 10));
    assert_eq!(plan.image_ops().count(), 0);
    assert!(!plan.is_placeholder());
}

#[test]
fn text_lines_advance_by_line_height() {
    let (mut store, _) = with_loaded_background(100, 100);
    let tx = store.add(LayerKind::Text);
    store.update(LayerKind::Text, tx, LayerField::Content("alpha beta gamma".into()));
    store.update(LayerKind::Text, tx, LayerField::FontSizePx(10.0));
    store.update(LayerKind::Text, tx, LayerField::MaxWidthPx(110.0));
    store.update(LayerKind::Text, tx, LayerField::X(0.0));
    store.update(LayerKind::Text, tx, LayerField::Y(0.0));

    let plan = compile_plan(&store, &mut unit(), &small_canvas_settings(100, 100));
    let lines: Vec<_> = plan.text_lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "alpha beta ");
    assert_eq!(lines[1].text, "gamma ");
    assert_eq!(lines[0].origin, Point::new(0.0, 0.0));
    assert_eq!(lines[1].origin, Point::new(0.0, 12.0));
    assert_eq!(lines[1].color, Rgba8::WHITE);
}
