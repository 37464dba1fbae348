use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;
use texflip::core::ConfigProvider;
use texflip::utils::validation::Validate;
use texflip::{EtlEngine, FlipPipeline, LocalStorage, TomlConfig};

fn job(dir: &std::path::Path, body: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[job]
name = "crafting-table"

[source]
directory = "{}"
{}
"#,
        dir.display().to_string().replace('\\', "/"),
        body
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn test_mer_remap_job_only_touches_mer_textures() {
    let dir = TempDir::new().unwrap();
    let mer = dir.path().join("table_mer.png");
    let albedo = dir.path().join("table_albedo.png");
    RgbImage::from_pixel(2, 2, Rgb([11, 22, 33]))
        .save_with_format(&mer, ImageFormat::Png)
        .unwrap();
    RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))
        .save_with_format(&albedo, ImageFormat::Png)
        .unwrap();
    let albedo_before = std::fs::read(&albedo).unwrap();

    let config = job(
        dir.path(),
        r#"suffix = "mer.png"

[transform]
operations = ["remap_channels"]
channel_map = "mer"
"#,
    );
    let storage = LocalStorage::new(config.input_dir());
    let engine = EtlEngine::new(FlipPipeline::new(storage, config));

    let report = engine.run().await.unwrap();

    assert_eq!(report.processed_count(), 1);
    let out = image::open(&mer).unwrap().to_rgb8();
    assert_eq!(out.get_pixel(0, 0), &Rgb([11, 33, 0]));
    assert_eq!(std::fs::read(&albedo).unwrap(), albedo_before);
}

#[tokio::test]
async fn test_flip_then_remap_keeps_alpha() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a_mer.png");
    let source = RgbaImage::from_fn(1, 2, |_, y| Rgba([y as u8, 50, 60 + y as u8, 200]));
    source.save_with_format(&path, ImageFormat::Png).unwrap();

    let config = job(
        dir.path(),
        r#"
[transform]
operations = ["flip_vertical", "remap_channels"]
channel_map = "r,b,zero"
"#,
    );
    let storage = LocalStorage::new(config.input_dir());
    EtlEngine::new(FlipPipeline::new(storage, config))
        .run()
        .await
        .unwrap();

    let out = image::open(&path).unwrap().to_rgba8();
    assert_eq!(out.get_pixel(0, 0), &Rgba([1, 61, 0, 200]));
    assert_eq!(out.get_pixel(0, 1), &Rgba([0, 60, 0, 200]));
}

#[tokio::test]
async fn test_report_is_written_as_json() {
    let dir = TempDir::new().unwrap();
    let textures = dir.path().join("texture");
    std::fs::create_dir(&textures).unwrap();
    RgbImage::new(4, 2)
        .save_with_format(textures.join("a.png"), ImageFormat::Png)
        .unwrap();
    std::fs::write(textures.join("b.png"), b"broken").unwrap();
    let report_path = dir.path().join("report.json");

    let config = job(
        &textures,
        r#"
[error_handling]
on_file_error = "skip"
"#,
    );
    let storage = LocalStorage::new(config.input_dir());
    let report = EtlEngine::new(FlipPipeline::new(storage, config))
        .run()
        .await
        .unwrap();
    report.save(&report_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["suffix"], ".png");
    assert_eq!(json["operations"][0], "flip_vertical");
    assert_eq!(json["files"][0]["file"], "a.png");
    assert_eq!(json["files"][0]["status"], "processed");
    assert_eq!(json["files"][0]["width"], 4);
    assert_eq!(json["files"][1]["status"], "failed");
    assert!(json["finished_at"].is_string());
}
