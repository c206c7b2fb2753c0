//! Image file storage.
//!
//! Image bytes live on disk under a root directory, grouped by the kind
//! of node they belong to; the database stores only relative paths.
//! All writes and deletes go through a [`FileJournal`] so that nothing
//! touches the disk until the surrounding transaction has committed.

use std::path::{Path, PathBuf};

use chrono::Utc;
use image::ImageFormat;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::image_repo;
use crate::error::{Result, SurveyError};

pub mod journal;

pub use journal::FileJournal;

/// Maximum accepted upload size.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image upload: {0}")]
    InvalidImage(String),

    #[error("Image of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },
}

/// Where an image belongs, which decides its subdirectory on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    ConfigIcon,
    InfoCard,
    FormQuestion,
    FormOption,
    TestQuestion,
    TestOption,
}

impl ImageCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageCategory::ConfigIcon => "config",
            ImageCategory::InfoCard => "info-card",
            ImageCategory::FormQuestion => "form-question",
            ImageCategory::FormOption => "form-option",
            ImageCategory::TestQuestion => "test-question",
            ImageCategory::TestOption => "test-option",
        }
    }
}

/// One uploaded image file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub alt: Option<String>,
}

/// Filesystem store for image files.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a stored relative path.
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Checks size and sniffs the format from the magic bytes. The
    /// client-supplied content type is ignored.
    pub fn validate(upload: &ImageUpload) -> std::result::Result<ImageFormat, StorageError> {
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge {
                size: upload.bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        let format = image::guess_format(&upload.bytes)
            .map_err(|_| StorageError::InvalidImage("unrecognized image data".into()))?;
        match format {
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif => Ok(format),
            other => Err(StorageError::InvalidImage(format!(
                "unsupported image format {other:?}"
            ))),
        }
    }

    fn new_relative_path(category: ImageCategory, format: ImageFormat) -> String {
        let ext = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            _ => "gif",
        };
        format!(
            "images/{}/{}_{}.{}",
            category.as_str(),
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple(),
            ext
        )
    }

    /// Validates the upload, stages the file write and inserts the
    /// image row. Returns the new image id.
    pub fn save(
        &self,
        conn: &Connection,
        journal: &mut FileJournal,
        category: ImageCategory,
        upload: &ImageUpload,
    ) -> Result<i64> {
        let format = Self::validate(upload)?;
        let relative = Self::new_relative_path(category, format);
        let id = image_repo::insert(conn, &relative, upload.alt.as_deref())?;
        journal.stage_write(self.absolute(&relative), upload.bytes.clone());
        log::debug!("Staged image {id} at {relative}");
        Ok(id)
    }

    /// Replaces the file behind an existing image id.
    ///
    /// If the new bytes are identical to the current ones this is a
    /// no-op and returns `false`. Otherwise the new file is written
    /// under a fresh path, the old file is deleted, and the row is
    /// repointed. Returns `true` when something changed.
    pub fn update(
        &self,
        conn: &Connection,
        journal: &mut FileJournal,
        image_id: i64,
        category: ImageCategory,
        upload: &ImageUpload,
    ) -> Result<bool> {
        let format = Self::validate(upload)?;
        let row = image_repo::find(conn, image_id)?
            .ok_or_else(|| SurveyError::NotFound(format!("image {image_id}")))?;

        let old_abs = self.absolute(&row.path);
        if let Some(current) = self.current_bytes(journal, &old_abs) {
            if current == upload.bytes {
                return Ok(false);
            }
        }

        let relative = Self::new_relative_path(category, format);
        image_repo::update_path(conn, image_id, &relative)?;
        journal.stage_write(self.absolute(&relative), upload.bytes.clone());
        journal.stage_delete(old_abs);
        Ok(true)
    }

    /// Deletes the image row and stages the file delete, but only when
    /// nothing references the image any more.
    pub fn delete_if_unused(
        &self,
        conn: &Connection,
        journal: &mut FileJournal,
        image_id: i64,
    ) -> Result<bool> {
        if !image_repo::is_unused(conn, image_id)? {
            return Ok(false);
        }
        let row = image_repo::find(conn, image_id)?
            .ok_or_else(|| SurveyError::NotFound(format!("image {image_id}")))?;
        image_repo::delete(conn, image_id)?;
        journal.stage_delete(self.absolute(&row.path));
        Ok(true)
    }

    /// Physically duplicates an image file under a new id, so that a
    /// cloned configuration never shares files with its source.
    pub fn duplicate(
        &self,
        conn: &Connection,
        journal: &mut FileJournal,
        image_id: i64,
        category: ImageCategory,
    ) -> Result<i64> {
        let row = image_repo::find(conn, image_id)?
            .ok_or_else(|| SurveyError::NotFound(format!("image {image_id}")))?;

        let abs = self.absolute(&row.path);
        let bytes = match self.current_bytes(journal, &abs) {
            Some(bytes) => bytes,
            None => {
                return Err(StorageError::Io {
                    path: abs,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "image file missing",
                    ),
                }
                .into())
            }
        };

        let ext = Path::new(&row.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let format = match ext {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "gif" => ImageFormat::Gif,
            _ => ImageFormat::Png,
        };

        let relative = Self::new_relative_path(category, format);
        let id = image_repo::insert(conn, &relative, row.alt.as_deref())?;
        journal.stage_write(self.absolute(&relative), bytes);
        Ok(id)
    }

    /// Current content of a file: a pending journal write wins over
    /// whatever is on disk.
    fn current_bytes(&self, journal: &FileJournal, abs: &Path) -> Option<Vec<u8>> {
        if let Some(staged) = journal.staged_bytes(abs) {
            return Some(staged.to_vec());
        }
        std::fs::read(abs).ok()
    }
}
