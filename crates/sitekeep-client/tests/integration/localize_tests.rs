use std::path::Path;

use axum::Router;
use axum::http::header;
use axum::routing::get;
use sitekeep_client::{ImageRsOptimizer, ReqwestFetcher};
use sitekeep_core::models::short_hash;
use sitekeep_core::{DirAssetStore, LocalizeConfig, LocalizeService};

use crate::common::{gradient_png, jpeg_bytes, png_bytes, spawn_server};

fn image_route(content_type: &'static str, body: Vec<u8>) -> axum::routing::MethodRouter {
    get(move || {
        let body = body.clone();
        async move { ([(header::CONTENT_TYPE, content_type)], body) }
    })
}

async fn service(assets: &Path) -> LocalizeService<ReqwestFetcher, ImageRsOptimizer, DirAssetStore> {
    let config = LocalizeConfig::default();
    let fetcher = ReqwestFetcher::new(&config.user_agent, config.timeout).unwrap();
    let store = DirAssetStore::open(assets).await.unwrap();
    LocalizeService::new(fetcher, ImageRsOptimizer::new(), store, config)
}

#[tokio::test]
async fn mirrors_images_and_rewrites_documents() {
    let red = jpeg_bytes([255, 0, 0]);
    let blue = jpeg_bytes([0, 0, 255]);
    let app = Router::new()
        .route("/photo.jpg", image_route("image/jpeg", red.clone()))
        .route("/a/pic.jpg", image_route("image/jpeg", red.clone()))
        .route("/b/pic.jpg", image_route("image/jpeg", blue.clone()))
        .route("/logo", image_route("image/png", png_bytes([0, 255, 0, 128])));
    let base = spawn_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let blog = tmp.path().join("blog");
    let assets = tmp.path().join("images").join("medium");
    std::fs::create_dir_all(blog.join("first")).unwrap();
    std::fs::create_dir_all(blog.join("second")).unwrap();

    let first = format!(
        "<html>\n<body>\n  <img src=\"{base}/photo.jpg\">\n  <img class=\"x\" src=\"/images/local.png\">\n  <img src=\"{base}/missing.jpg\" alt=\"gone\">\n</body>\n</html>\n"
    );
    let second = format!(
        "<p><img src=\"{base}/a/pic.jpg\"><img src=\"{base}/b/pic.jpg\"><img src=\"{base}/logo\"></p>"
    );
    std::fs::write(blog.join("first/index.html"), &first).unwrap();
    std::fs::write(blog.join("second/index.html"), &second).unwrap();

    let svc = service(&assets).await;
    let report = svc.localize_tree(&blog).await.unwrap();

    assert_eq!(report.documents_scanned, 2);
    assert_eq!(report.documents_rewritten, 2);
    assert_eq!(report.references_rewritten, 4);
    assert_eq!(report.references_skipped, 1);
    assert_eq!(report.assets_written, 4);

    assert_eq!(
        std::fs::read_to_string(blog.join("first/index.html")).unwrap(),
        format!(
            "<html>\n<body>\n  <img src=\"/images/medium/photo.jpg\">\n  <img class=\"x\" src=\"/images/local.png\">\n  <img src=\"{base}/missing.jpg\" alt=\"gone\">\n</body>\n</html>\n"
        )
    );

    let suffixed = format!("pic-{}.jpg", short_hash(&blue));
    assert_eq!(
        std::fs::read_to_string(blog.join("second/index.html")).unwrap(),
        format!(
            "<p><img src=\"/images/medium/pic.jpg\"><img src=\"/images/medium/{suffixed}\"><img src=\"/images/medium/logo.png\"></p>"
        )
    );

    for name in ["photo.jpg", "pic.jpg", suffixed.as_str(), "logo.png"] {
        let data = std::fs::read(assets.join(name)).unwrap();
        image::load_from_memory(&data).expect("stored asset should decode");
    }
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let app = Router::new().route("/photo.jpg", image_route("image/jpeg", jpeg_bytes([9, 9, 9])));
    let base = spawn_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let doc = tmp.path().join("index.html");
    std::fs::write(&doc, format!("<img src=\"{base}/photo.jpg\">")).unwrap();
    let assets = tmp.path().join("assets");

    let svc = service(&assets).await;
    let first = svc.localize_tree(tmp.path()).await.unwrap();
    let doc_after_first = std::fs::read(&doc).unwrap();
    let asset_after_first = std::fs::read(assets.join("photo.jpg")).unwrap();

    let second = svc.localize_tree(tmp.path()).await.unwrap();

    assert_eq!(first.references_rewritten, 1);
    assert_eq!(second.references_rewritten, 0);
    assert_eq!(second.assets_written, 0);
    assert_eq!(std::fs::read(&doc).unwrap(), doc_after_first);
    assert_eq!(std::fs::read(assets.join("photo.jpg")).unwrap(), asset_after_first);
    assert_eq!(std::fs::read_dir(&assets).unwrap().count(), 1);
}

#[tokio::test]
async fn same_image_from_two_hosts_is_stored_once() {
    let bytes = jpeg_bytes([1, 2, 3]);
    let app_a = Router::new().route("/img/photo.jpg", image_route("image/jpeg", bytes.clone()));
    let app_b = Router::new().route("/photo.jpg", image_route("image/jpeg", bytes));
    let base_a = spawn_server(app_a).await;
    let base_b = spawn_server(app_b).await;

    let tmp = tempfile::tempdir().unwrap();
    let assets = tmp.path().join("assets");
    let svc = service(&assets).await;

    let html = format!("<img src=\"{base_a}/img/photo.jpg\"><img src=\"{base_b}/photo.jpg\">");
    let (out, report) = svc.localize_html(&html).await.unwrap();

    assert_eq!(
        out,
        "<img src=\"/images/medium/photo.jpg\"><img src=\"/images/medium/photo.jpg\">"
    );
    assert_eq!(report.assets_written, 1);
    assert_eq!(std::fs::read_dir(&assets).unwrap().count(), 1);
}

#[tokio::test]
async fn non_image_payload_is_stored_verbatim() {
    let app = Router::new().route(
        "/weird.bin",
        image_route("application/octet-stream", b"opaque payload".to_vec()),
    );
    let base = spawn_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let assets = tmp.path().join("assets");
    let svc = service(&assets).await;

    let asset = svc
        .localize_reference(&format!("{base}/weird.bin"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(asset.filename, "weird.bin");
    assert_eq!(std::fs::read(assets.join("weird.bin")).unwrap(), b"opaque payload");
}

#[tokio::test]
async fn png_keeps_its_pixels_and_jpeg_becomes_progressive() {
    let (source, png) = gradient_png();
    let app = Router::new()
        .route("/logo.png", image_route("image/png", png))
        .route("/photo.jpg", image_route("image/jpeg", jpeg_bytes([200, 120, 40])));
    let base = spawn_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let assets = tmp.path().join("assets");
    let svc = service(&assets).await;

    let html = format!("<img src=\"{base}/logo.png\"><img src=\"{base}/photo.jpg\">");
    let (_, report) = svc.localize_html(&html).await.unwrap();
    assert_eq!(report.assets_written, 2);

    let stored_png = std::fs::read(assets.join("logo.png")).unwrap();
    assert_eq!(image::guess_format(&stored_png).unwrap(), image::ImageFormat::Png);
    let pixels = image::load_from_memory(&stored_png).unwrap().to_rgba8();
    assert_eq!(pixels, source);

    let stored_jpeg = std::fs::read(assets.join("photo.jpg")).unwrap();
    assert!(stored_jpeg.windows(2).any(|w| w == [0xFF, 0xC2]));
    let decoded = image::load_from_memory(&stored_jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
}
