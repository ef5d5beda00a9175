use futures_util::future::BoxFuture;

/// Pixel region of the source image to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

impl CropBox {
    /// Non-negative origin and a non-empty area. Whether the box fits inside
    /// the image is for the avatar store to decide once it has the image.
    pub fn is_well_formed(&self) -> bool {
        self.x_start >= 0 && self.y_start >= 0 && self.x_start < self.x_end && self.y_start < self.y_end
    }
}

/// Fetches profile photos and owns the files derived from them.
pub trait AvatarStore: Send + Sync {
    /// Downloads `url`, applies `crop` and returns the public URL of the
    /// stored image.
    fn fetch_and_crop<'a>(&'a self, url: &'a str, crop: CropBox) -> BoxFuture<'a, anyhow::Result<String>>;

    /// Deletes every stored avatar. Must be idempotent.
    fn purge(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Avatar store for deployments without photo support: every upload is
/// refused and there is nothing to purge.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAvatars;

impl AvatarStore for NoAvatars {
    fn fetch_and_crop<'a>(&'a self, _url: &'a str, _crop: CropBox) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async { Err(anyhow::anyhow!("profile photos are not enabled")) })
    }

    fn purge(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_box_must_have_area() {
        let ok = CropBox { x_start: 0, y_start: 0, x_end: 10, y_end: 10 };
        assert!(ok.is_well_formed());

        let flat = CropBox { y_end: 0, ..ok };
        assert!(!flat.is_well_formed());

        let negative = CropBox { x_start: -1, ..ok };
        assert!(!negative.is_well_formed());
    }
}
