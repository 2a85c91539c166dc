use std::collections::HashMap;

use super::*;

#[test]
fn defaults_are_valid() {
    let s = ComposeSettings::default();
    s.validate().unwrap();
    assert_eq!(s.min_canvas, Canvas::new(800, 600));
    assert_eq!(s.placeholder().to_hex(), "#1e293b");
    assert_eq!(s.line_height_factor, 1.2);
    assert_eq!(s.box_padding_factor, 0.5);
}

#[test]
fn partial_json_keeps_defaults() {
    let s: ComposeSettings = serde_json::from_str(r#"{ "lineHeightFactor": 1.5 }"#).unwrap();
    assert_eq!(s.line_height_factor, 1.5);
    assert_eq!(s.min_canvas, Canvas::new(800, 600));
}

#[test]
fn overrides_apply_font_and_canvas() {
    let env: HashMap<&str, &str> =
        HashMap::from([(ENV_FONT, "/fonts/Outfit.ttf"), (ENV_MIN_CANVAS, "320x240")]);
    let s = ComposeSettings::default()
        .with_overrides_from(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(s.font_path, Some(PathBuf::from("/fonts/Outfit.ttf")));
    assert_eq!(s.min_canvas, Canvas::new(320, 240));
}

#[test]
fn bad_override_is_rejected() {
    let err = ComposeSettings::default()
        .with_overrides_from(|k| (k == ENV_MIN_CANVAS).then(|| "wide".to_string()))
        .unwrap_err();
    assert!(matches!(err, StackshotError::Validation(_)));
}

#[test]
fn zero_canvas_fails_validation() {
    let s = ComposeSettings {
        min_canvas: Canvas::new(0, 600),
        ..ComposeSettings::default()
    };
    assert!(s.validate().is_err());
}

#[test]
fn missing_settings_file_is_an_error() {
    assert!(ComposeSettings::from_path(Path::new("/nonexistent/stackshot.json")).is_err());
}
