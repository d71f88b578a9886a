/// Profile picture storage
///
/// Uploaded pictures are decoded, shrunk to fit within 125×125 (aspect ratio
/// kept, never enlarged) and written under a random 16-hex-digit name with the upload's
/// extension. The built-in `default.jpg` is never written or deleted.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use rand::Rng;
use tracing::{debug, warn};

use crate::models::user::DEFAULT_PROFILE_PICTURE;

/// Bounding box of stored thumbnails (pixels)
pub const THUMBNAIL_SIZE: u32 = 125;

/// Extensions accepted for uploads (case-insensitive)
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Picture must be a jpg or png file")]
    UnsupportedExtension,

    #[error("Picture could not be decoded: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("Picture storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Picture processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Lowercased extension of an upload's filename, if it is an accepted one
pub fn picture_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Directory-backed store for profile pictures
#[derive(Debug, Clone)]
pub struct PictureStore {
    base_dir: PathBuf,
}

impl PictureStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Creates the storage directory if missing
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        Ok(())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Thumbnails and stores an upload, returning the stored filename
    pub async fn save(&self, bytes: Vec<u8>, original_filename: &str) -> Result<String, StorageError> {
        let ext = picture_extension(original_filename).ok_or(StorageError::UnsupportedExtension)?;
        let format = if ext == "png" {
            ImageFormat::Png
        } else {
            ImageFormat::Jpeg
        };

        let name = format!("{:016x}.{}", rand::thread_rng().gen::<u64>(), ext);

        let encoded = tokio::task::spawn_blocking(move || encode_thumbnail(&bytes, format)).await??;

        self.ensure_dir().await?;
        tokio::fs::write(self.path_of(&name), encoded).await?;

        debug!(picture = %name, "Stored profile picture");
        Ok(name)
    }

    /// Removes a stored picture
    ///
    /// The default picture, names that aren't plain filenames and files that
    /// are already gone are all ignored.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        if name == DEFAULT_PROFILE_PICTURE || !is_plain_filename(name) {
            return Ok(());
        }

        match tokio::fs::remove_file(self.path_of(name)).await {
            Ok(()) => {
                debug!(picture = %name, "Deleted profile picture");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(picture = %name, "Profile picture already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn encode_thumbnail(bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>, StorageError> {
    let image = image::load_from_memory(bytes)?;
    let thumbnail = if image.width() > THUMBNAIL_SIZE || image.height() > THUMBNAIL_SIZE {
        image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
    } else {
        image
    };

    // JPEG has no alpha channel
    let thumbnail = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(thumbnail.to_rgb8()),
        _ => thumbnail,
    };

    let mut out = Cursor::new(Vec::new());
    thumbnail.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
