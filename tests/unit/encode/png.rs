use super::*;
use chrono::TimeZone;

use crate::{
    config::ComposeSettings,
    foundation::core::Canvas,
    layers::model::ImageKind,
};

#[test]
fn file_name_replaces_colons_and_dots() {
    let at = chrono::Utc
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
        .unwrap()
        + chrono::Duration::milliseconds(42);
    assert_eq!(
        export_file_name_at(at),
        "composition-2024-03-09T14-05-07-042Z.png"
    );
}

#[test]
fn default_name_has_the_expected_shape() {
    let name = default_export_file_name();
    assert!(name.starts_with("composition-"));
    assert!(name.ends_with("Z.png"));
    assert!(!name.contains(':'));
}

#[test]
fn export_without_background_is_refused() {
    let mut comp = Compositor::from_settings(ComposeSettings::default());
    let err = export_png(&LayerStore::starter(), &mut comp).unwrap_err();
    assert!(matches!(err, StackshotError::ExportRefused(_)));
    assert_eq!(err.user_notice(), NO_BACKGROUND_NOTICE);
}

#[test]
fn export_decodes_back_to_canvas_size() {
    let settings = ComposeSettings {
        min_canvas: Canvas::new(12, 9),
        ..ComposeSettings::default()
    };
    let mut store = LayerStore::starter();
    let bg = store.backgrounds()[0].id;
    store.mark_loaded(
        ImageKind::Background,
        bg,
        std::sync::Arc::new(crate::assets::decode::DecodedImage::solid(12, 9, [10, 200, 30, 255])),
        "bg.png",
    );
    let mut comp = Compositor::from_settings(settings);

    let bytes = export_png(&store, &mut comp).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (12, 9));
    assert_eq!(back.get_pixel(6, 4).0, [10, 200, 30, 255]);
}

#[test]
fn write_png_creates_parent_dirs() {
    let dir = std::env::temp_dir().join(format!("stackshot-png-{}", std::process::id()));
    let path = dir.join("nested").join("out.png");
    write_png(&path, b"not really a png").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"not really a png");
    let _ = std::fs::remove_dir_all(&dir);
}
