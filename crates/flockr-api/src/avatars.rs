use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, bail};
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use image::{DynamicImage, GenericImageView, ImageFormat};
use reqwest::Client;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use flockr_core::{AvatarStore, CropBox};

/// Largest image accepted for a profile photo.
const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Decodes a JPEG, cuts `crop` out of it and re-encodes the result as JPEG.
fn crop_jpeg(bytes: &[u8], crop: CropBox) -> anyhow::Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .context("image is not a readable JPEG")?;
    let (width, height) = img.dimensions();

    let x = u32::try_from(crop.x_start)?;
    let y = u32::try_from(crop.y_start)?;
    let x_end = u32::try_from(crop.x_end).unwrap_or(u32::MAX);
    let y_end = u32::try_from(crop.y_end).unwrap_or(u32::MAX);
    if x >= x_end || y >= y_end {
        bail!("crop box is empty");
    }
    if x_end > width || y_end > height {
        bail!("crop not within dimensions of image ({}x{})", width, height);
    }

    let cropped = DynamicImage::from(img.crop_imm(x, y, x_end - x, y_end - y).to_rgb8());
    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}

/// Stores cropped profile photos as flat files under `dir`, served back at
/// `{public_url}/static/{file}`.
pub struct DiskAvatarStore {
    dir: PathBuf,
    public_url: String,
    client: Client,
}

impl DiskAvatarStore {
    pub async fn new(dir: PathBuf, public_url: impl Into<String>) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Avatar directory: {}", dir.display());
        Ok(Self {
            dir,
            public_url: public_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    fn public_path(&self, file_name: &str) -> String {
        format!("{}/static/{}", self.public_url, file_name)
    }

    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("image request failed")?;

        if !resp.status().is_success() {
            bail!("image download failed ({})", resp.status());
        }
        if resp.content_length().is_some_and(|len| len > MAX_AVATAR_BYTES) {
            bail!("image is larger than {} bytes", MAX_AVATAR_BYTES);
        }

        let mut body = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("image download interrupted")?;
            if (body.len() + chunk.len()) as u64 > MAX_AVATAR_BYTES {
                bail!("image is larger than {} bytes", MAX_AVATAR_BYTES);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn store_cropped(&self, url: &str, crop: CropBox) -> anyhow::Result<String> {
        let original = self.download(url).await?;
        let original_len = original.len();

        let jpeg = tokio::task::spawn_blocking(move || crop_jpeg(&original, crop)).await??;

        let file_name = format!("{}.jpg", Uuid::new_v4());
        fs::write(self.dir.join(&file_name), &jpeg).await?;

        debug!(
            "Stored avatar {} ({} bytes cropped from {}, crop {:?})",
            file_name,
            jpeg.len(),
            original_len,
            crop
        );
        Ok(self.public_path(&file_name))
    }

    async fn remove_all(&self) -> anyhow::Result<()> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Purged {} avatar files", removed);
        }
        Ok(())
    }
}

impl AvatarStore for DiskAvatarStore {
    fn fetch_and_crop<'a>(
        &'a self,
        url: &'a str,
        crop: CropBox,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(self.store_cropped(url, crop))
    }

    fn purge(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(self.remove_all())
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    /// A `width` x `height` JPEG, encoded in memory.
    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::from(img).write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn crop_keeps_only_the_requested_region() {
        let crop = CropBox { x_start: 2, y_start: 1, x_end: 10, y_end: 5 };
        let cropped = crop_jpeg(&jpeg(12, 8), crop).unwrap();

        let img = image::load_from_memory_with_format(&cropped, ImageFormat::Jpeg).unwrap();
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[test]
    fn crop_must_fit_inside_the_image() {
        let full = CropBox { x_start: 0, y_start: 0, x_end: 12, y_end: 8 };
        assert!(crop_jpeg(&jpeg(12, 8), full).is_ok());

        let too_wide = CropBox { x_end: 13, ..full };
        let err = crop_jpeg(&jpeg(12, 8), too_wide).unwrap_err();
        assert!(err.to_string().contains("crop not within dimensions"));

        let too_tall = CropBox { y_end: 9, ..full };
        assert!(crop_jpeg(&jpeg(12, 8), too_tall).is_err());
    }

    #[test]
    fn non_jpeg_bytes_are_rejected() {
        let crop = CropBox { x_start: 0, y_start: 0, x_end: 1, y_end: 1 };
        assert!(crop_jpeg(b"definitely not an image", crop).is_err());
    }

    #[tokio::test]
    async fn public_urls_point_at_static_route() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskAvatarStore::new(dir.path().to_path_buf(), "http://localhost:8080/")
            .await
            .unwrap();

        assert_eq!(
            store.public_path("a.jpg"),
            "http://localhost:8080/static/a.jpg"
        );
    }

    #[tokio::test]
    async fn purge_empties_the_directory_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskAvatarStore::new(dir.path().join("static"), "http://localhost")
            .await
            .unwrap();
        fs::write(dir.path().join("static/one.jpg"), b"x").await.unwrap();
        fs::write(dir.path().join("static/two.jpg"), b"y").await.unwrap();

        store.purge().await.unwrap();
        store.purge().await.unwrap();

        let mut entries = fs::read_dir(dir.path().join("static")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskAvatarStore::new(dir.path().to_path_buf(), "http://localhost")
            .await
            .unwrap();
        let crop = CropBox { x_start: 0, y_start: 0, x_end: 1, y_end: 1 };

        assert!(store.fetch_and_crop("http://127.0.0.1:1/me.jpg", crop).await.is_err());
    }
}
