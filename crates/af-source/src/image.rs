use std::path::Path;
use std::sync::Arc;

use af_core::error::CoreError;
use af_core::frame::PixelFrame;
use af_core::traits::Source;
use anyhow::{Context, Result};

/// Source d'image statique. Retourne toujours la même frame.
///
/// # Example
/// ```no_run
/// use af_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::new(Path::new("test.png")).unwrap();
/// ```
pub struct ImageSource {
    frame: Arc<PixelFrame>,
}

impl ImageSource {
    /// Load an image from disk and create a source.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded.
    pub fn new(path: &Path) -> Result<Self> {
        let frame = load_image(path)?;
        log::info!(
            "Image chargée : {} ({}×{})",
            path.display(),
            frame.width,
            frame.height
        );
        Ok(Self {
            frame: Arc::new(frame),
        })
    }
}

impl Source for ImageSource {
    fn next_frame(&mut self) -> Option<Arc<PixelFrame>> {
        Some(Arc::clone(&self.frame))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Décode une image (PNG, JPEG, BMP, GIF) en pixels packés `0xAARRGGBB`.
///
/// # Errors
/// Returns [`CoreError::FileNotFound`] for a missing path,
/// [`CoreError::UnsupportedFormat`] for an unknown extension, or the
/// decoder error otherwise.
///
/// # Example
/// ```no_run
/// use af_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("test.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<PixelFrame> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    if image::ImageFormat::from_path(path).is_err() {
        let format = path.extension().map_or_else(
            || "(sans extension)".to_string(),
            |e| e.to_string_lossy().into_owned(),
        );
        return Err(CoreError::UnsupportedFormat { format }.into());
    }
    let img =
        image::open(path).with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(PixelFrame::from_rgba8(w, h, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trips_into_packed_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 128, 255, 255]));
        img.save(&path).unwrap();

        let mut source = ImageSource::new(&path).unwrap();
        assert_eq!(source.native_size(), (2, 1));
        assert!(!source.is_live());
        let frame = source.next_frame().unwrap();
        assert_eq!(frame.data, vec![0xFFFF_0000, 0xFF00_80FF]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_image(Path::new("/nonexistent/none.png")).unwrap_err();
        assert!(format!("{err}").contains("none.png"));
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.xyz");
        std::fs::write(&path, b"not an image").unwrap();
        let err = load_image(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::UnsupportedFormat { format }) if format == "xyz"
        ));
    }
}
