use anyhow::Result;
use brush_canvas::draw::model::Color;
use brush_canvas::draw::settings::CanvasSettings;
use brush_canvas::draw::settings_store::{load_from_path, save_to_path};

#[test]
fn missing_file_yields_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let loaded = load_from_path(&dir.path().join("absent.json"))?;
    assert_eq!(loaded, CanvasSettings::default());
    Ok(())
}

#[test]
fn blank_file_yields_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("brush_settings.json");
    std::fs::write(&path, "  \n")?;
    assert_eq!(load_from_path(&path)?, CanvasSettings::default());
    Ok(())
}

#[test]
fn save_then_load_preserves_values() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("brush_settings.json");
    let settings = CanvasSettings {
        stroke_width: 24.0,
        stroke_color: Color::from_argb(0xFF00_80FF),
        smoothing_divisor: 4.0,
        min_sample_distance: 1.5,
        export_suffix: "notes".into(),
        debug_logging: true,
        ..CanvasSettings::default()
    };

    save_to_path(&path, &settings)?;
    assert_eq!(load_from_path(&path)?, settings);
    Ok(())
}

#[test]
fn partial_file_fills_defaults_and_repairs_ranges() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("brush_settings.json");
    std::fs::write(
        &path,
        r#"{ "stroke_width": 500.0, "smoothing_divisor": 0.0, "export_folder": "" }"#,
    )?;

    let loaded = load_from_path(&path)?;
    assert_eq!(loaded.stroke_width, 100.0);
    assert_eq!(loaded.smoothing_divisor, 3.0);
    assert_eq!(loaded.export_folder, "brush_exports");
    assert_eq!(loaded.stroke_color, Color::BLACK);
    Ok(())
}

#[test]
fn malformed_file_reports_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("brush_settings.json");
    std::fs::write(&path, "{ not json")?;

    let err = load_from_path(&path).expect_err("malformed settings");
    assert!(format!("{err:#}").contains("brush_settings.json"));
    Ok(())
}
