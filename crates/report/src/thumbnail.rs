use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use crate::Result;

/// A thumbnail re-encoded as RGB PNG, ready to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    /// Decode any format `image` understands (jpeg, webp, png...) and
    /// flatten it to RGB PNG
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        let (width, height) = rgb.dimensions();

        let mut png = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;

        Ok(Self { png, width, height })
    }
}

/// Gets a thumbnail image from a URL
pub trait ThumbnailFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Thumbnail>;
}

/// Downloads thumbnails over HTTP
pub struct HttpThumbnails {
    client: reqwest::blocking::Client,
}

impl HttpThumbnails {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ThumbnailFetcher for HttpThumbnails {
    fn fetch(&self, url: &str) -> Result<Thumbnail> {
        let bytes = self.client.get(url).send()?.error_for_status()?.bytes()?;
        Thumbnail::from_bytes(&bytes)
    }
}
