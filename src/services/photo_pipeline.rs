use crate::api::error::AppError;
use crate::config::AppConfig;
use bytes::Bytes;
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use rand::Rng;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Prefix of every stored photo name
pub const RAW_PREFIX: &str = "photo-";

/// Prefix of the intermediate file written while re-encoding
pub const PROCESSED_PREFIX: &str = "proc-";

/// Where an ingestion currently is. A photo that clears every stage ends `Promoted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Validated,
    Stored,
    Processed,
    Promoted,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::Received => "received",
            IngestStage::Validated => "validated",
            IngestStage::Stored => "stored",
            IngestStage::Processed => "processed",
            IngestStage::Promoted => "promoted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PhotoError {
    /// Rejected before anything touched the disk
    #[error("{0}")]
    Validation(String),

    /// `stage` is the stage that could not be reached
    #[error("could not reach '{stage}' stage: {reason}")]
    Processing { stage: IngestStage, reason: String },
}

impl PhotoError {
    fn processing(stage: IngestStage, reason: impl fmt::Display) -> Self {
        PhotoError::Processing {
            stage,
            reason: reason.to_string(),
        }
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::Validation(msg) => AppError::Validation(msg),
            processing => AppError::Processing(processing.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoLimits {
    pub max_size: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl From<&AppConfig> for PhotoLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_size: config.max_photo_size,
            max_width: config.photo_max_width,
            max_height: config.photo_max_height,
            quality: config.photo_quality,
        }
    }
}

/// A photo as it arrived from the client, fully buffered
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedPhoto {
    /// Relative URL under the public prefix, e.g. `/uploads/photo-1700000000000000-42.jpg`
    pub public_path: String,
    pub original_name: String,
}

pub struct PhotoPipeline {
    upload_root: PathBuf,
    public_prefix: String,
    limits: PhotoLimits,
}

impl PhotoPipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upload_root: config.upload_dir.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            limits: PhotoLimits::from(config),
        }
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    pub fn limits(&self) -> PhotoLimits {
        self.limits
    }

    /// Validate, store, resize and promote one photo.
    ///
    /// On success exactly one file exists for the returned public path and it holds the
    /// re-encoded image. On a processing failure the stored and intermediate files are
    /// removed best-effort; a removal failure is logged and otherwise ignored.
    pub async fn ingest(&self, photo: IncomingPhoto) -> Result<IngestedPhoto, PhotoError> {
        debug!("📸 Photo '{}' {}", photo.original_name, IngestStage::Received);
        self.validate(&photo.content_type, photo.data.len())?;
        debug!(
            "📸 Photo '{}' {} ({} bytes, {})",
            photo.original_name,
            IngestStage::Validated,
            photo.data.len(),
            photo.content_type
        );

        let stored_name = generate_file_name(&photo.original_name);
        let stored_path = self.upload_root.join(&stored_name);
        let processed_path = self
            .upload_root
            .join(format!("{}{}", PROCESSED_PREFIX, stored_name));

        self.store(&photo.data, &stored_path).await?;
        debug!("📸 {} {}", stored_name, IngestStage::Stored);

        if let Err(e) = self.process_and_promote(&stored_path, &processed_path).await {
            self.discard(&[&stored_path, &processed_path]).await;
            return Err(e);
        }

        info!(
            "✅ Photo '{}' ingested as {}",
            photo.original_name, stored_name
        );

        Ok(IngestedPhoto {
            public_path: self.public_path_for(&stored_name),
            original_name: photo.original_name,
        })
    }

    /// Declared type must be `image/*` and the size must fit the ceiling
    pub fn validate(&self, content_type: &str, size: usize) -> Result<(), PhotoError> {
        let is_image = content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(PhotoError::Validation(format!(
                "Unsupported file type '{}': only images are allowed",
                content_type
            )));
        }

        if size == 0 {
            return Err(PhotoError::Validation("Uploaded photo is empty".to_string()));
        }

        if size > self.limits.max_size {
            return Err(PhotoError::Validation(format!(
                "Photo size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                self.limits.max_size,
                self.limits.max_size / 1024 / 1024
            )));
        }

        Ok(())
    }

    async fn store(&self, data: &[u8], path: &Path) -> Result<(), PhotoError> {
        tokio::fs::create_dir_all(&self.upload_root)
            .await
            .map_err(|e| PhotoError::processing(IngestStage::Stored, e))?;

        // create_new: a name collision fails instead of clobbering another upload
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| PhotoError::processing(IngestStage::Stored, e))?;

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            self.discard(&[path]).await;
            return Err(PhotoError::processing(IngestStage::Stored, e));
        }

        Ok(())
    }

    async fn process_and_promote(&self, stored: &Path, processed: &Path) -> Result<(), PhotoError> {
        let limits = self.limits;
        let src = stored.to_path_buf();
        let dst = processed.to_path_buf();

        let (width, height) = tokio::task::spawn_blocking(move || resize_and_encode(&src, &dst, limits))
            .await
            .map_err(|e| PhotoError::processing(IngestStage::Processed, e))??;
        debug!(
            "📸 {} {} ({}x{})",
            stored.display(),
            IngestStage::Processed,
            width,
            height
        );

        // Single rename over the stored file: the public name never points at a missing file
        tokio::fs::rename(processed, stored)
            .await
            .map_err(|e| PhotoError::processing(IngestStage::Promoted, e))?;

        Ok(())
    }

    async fn discard(&self, paths: &[&Path]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!("🧹 Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("⚠️ Could not remove {}: {}", path.display(), e),
            }
        }
    }

    pub fn public_path_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix, file_name)
    }

    /// Maps a public path back into the upload root.
    /// Only a plain file name directly under the public prefix resolves.
    pub fn resolve_public_path(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')?;

        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return None;
        }

        Some(self.upload_root.join(name))
    }

    /// Deletes the file behind a public path
    pub async fn remove(&self, public_path: &str) -> std::io::Result<()> {
        let path = self.resolve_public_path(public_path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' does not point inside the upload root", public_path),
            )
        })?;
        tokio::fs::remove_file(path).await
    }
}

/// `photo-<unix micros>-<random>.<ext>`
pub fn generate_file_name(original_name: &str) -> String {
    let micros = Utc::now().timestamp_micros();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}{}-{}{}",
        RAW_PREFIX,
        micros,
        suffix,
        sanitized_extension(original_name)
    )
}

fn sanitized_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Shrinks to fit inside `max_width` x `max_height`, keeping the aspect ratio.
/// Images already inside the box come back untouched.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

fn resize_and_encode(src: &Path, dst: &Path, limits: PhotoLimits) -> Result<(u32, u32), PhotoError> {
    let stage = IngestStage::Processed;

    // The stored extension is whatever the client sent, so sniff the real format
    let img = image::io::Reader::open(src)
        .map_err(|e| PhotoError::processing(stage, e))?
        .with_guessed_format()
        .map_err(|e| PhotoError::processing(stage, e))?
        .decode()
        .map_err(|e| PhotoError::processing(stage, format!("failed to decode image: {}", e)))?;

    let rgb = fit_within(img, limits.max_width, limits.max_height).to_rgb8();

    let file = std::fs::File::create(dst).map_err(|e| PhotoError::processing(stage, e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, limits.quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| PhotoError::processing(stage, format!("failed to encode JPEG: {}", e)))?;
    writer.flush().map_err(|e| PhotoError::processing(stage, e))?;

    Ok((rgb.width(), rgb.height()))
}
