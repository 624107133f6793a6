use std::path::{Path, PathBuf};

use chrono::Utc;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};

use crate::resp::problem::Problem;

/// Stores uploaded registration images and hands back the reference URL
/// persisted on the student entity. Files land in the configured upload
/// directory and are served back under `/uploads/<name>`.
///
/// A stored file whose registration later fails to persist is not cleaned
/// up; there is no reconciliation job.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

fn image_extension(content_type: Option<&ContentType>) -> Option<&'static str> {
    match content_type {
        Some(ct) if *ct == ContentType::JPEG => Some("jpg"),
        Some(ct) if *ct == ContentType::PNG => Some("png"),
        _ => None,
    }
}

impl MediaStore {
    pub fn new(root: impl AsRef<Path>) -> MediaStore {
        MediaStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists a single uploaded image under `<epoch-millis>-<kind>.<ext>`
    /// and returns its public URL. Only JPEG and PNG uploads are accepted.
    pub async fn store(&self, file: &mut TempFile<'_>, kind: &str) -> Result<String, Problem> {
        let ext = image_extension(file.content_type()).ok_or_else(|| {
            Problem::new(
                Status::BadRequest,
                format!("Only JPEG and PNG images are accepted for {}", kind),
            )
        })?;

        let name = format!("{}-{}.{}", Utc::now().timestamp_millis(), kind, ext);
        let destination = self.root.join(&name);

        // copy_to rather than persist_to: the upload directory may live on
        // a different filesystem than the temp dir.
        file.copy_to(&destination).await?;
        tracing::debug!("stored {} upload at {}", kind, destination.display());

        Ok(format!("/uploads/{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_jpeg_and_png_map_to_extensions() {
        assert_eq!(image_extension(Some(&ContentType::JPEG)), Some("jpg"));
        assert_eq!(image_extension(Some(&ContentType::PNG)), Some("png"));
        assert_eq!(image_extension(Some(&ContentType::GIF)), None);
        assert_eq!(image_extension(Some(&ContentType::PDF)), None);
        assert_eq!(image_extension(None), None);
    }
}
