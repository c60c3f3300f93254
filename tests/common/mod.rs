#![allow(dead_code)]

use std::io::Cursor;

use serde_json::{Value, json};
use tryon_studio::http::request::FileRef;

/// A real PNG of the given size.
pub fn png(name: &str, width: u32, height: u32) -> FileRef {
    let img = image::RgbImage::new(width, height);
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    FileRef::new(name, bytes.into_inner())
}

pub fn file(name: &str, bytes: &[u8]) -> FileRef {
    FileRef::new(name, bytes.to_vec())
}

pub fn done(message: &str, download: &str) -> Value {
    json!({ "message": message, "download": download })
}

pub fn uploaded() -> Value {
    json!({ "message": "Person image uploaded", "path": "/srv/uploads/1.png" })
}

pub fn models() -> Value {
    json!({
        "ckpt_choices": ["sd15.safetensors", "sdxl.safetensors"],
        "vae_choices": ["vae-ft-mse.safetensors"],
        "recommended_ckpt": "sdxl.safetensors",
        "recommended_vae": "vae-ft-mse.safetensors",
        "selected_ckpt": null,
        "selected_vae": null
    })
}

pub fn presets() -> Value {
    json!({
        "quality": ["best quality", "masterpiece"],
        "negative_default": "lowres, blurry, watermark",
        "styles": {
            "anime": { "name": "Anime", "positive": ["anime style", "cel shading"] },
            "photoreal": { "name": "Photoreal", "positive": ["photorealistic"] }
        }
    })
}
