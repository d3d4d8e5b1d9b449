use std::io::Cursor;

use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Test server crashed");
    });
    format!("http://{addr}")
}

pub fn jpeg_bytes(color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(color)));
    encode(img, ImageFormat::Jpeg)
}

pub fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(color)));
    encode(img, ImageFormat::Png)
}

/// A translucent gradient, so lossy handling would show up in the pixels.
pub fn gradient_png() -> (RgbaImage, Vec<u8>) {
    let mut img = RgbaImage::new(24, 16);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgba([(x * 10) as u8, (y * 15) as u8, ((x + y) * 5) as u8, (40 + x * 8) as u8]);
    }
    let bytes = encode(DynamicImage::ImageRgba8(img.clone()), ImageFormat::Png);
    (img, bytes)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode test image");
    buf
}
