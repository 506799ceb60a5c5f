use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;
use tracing::{info, warn};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

const MB: usize = 1024 * 1024;

/// Which resource class an upload belongs to. Picks the filename prefix and
/// the size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Noticia,
    Evento,
    Galeria,
}

impl MediaKind {
    fn prefix(self) -> &'static str {
        match self {
            MediaKind::Noticia => "noticia",
            MediaKind::Evento => "evento",
            MediaKind::Galeria => "galeria",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            MediaKind::Noticia | MediaKind::Evento => 5 * MB,
            MediaKind::Galeria => 10 * MB,
        }
    }
}

/// Validation failures are distinct from storage failures: the former map to
/// a 400 response, the latter to a 500.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Solo se permiten imágenes")]
    UnsupportedType,
    #[error("El archivo es demasiado grande")]
    TooLarge,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes validated image uploads under `<public_dir>/uploads` and hands out
/// the public path stored in the database.
///
/// The directory is shared mutable state across concurrent requests; that is
/// safe because generated filenames are collision-resistant, not because of
/// any locking.
pub struct MediaStore {
    uploads_dir: PathBuf,
}

impl MediaStore {
    pub async fn new(public_dir: &Path) -> anyhow::Result<Self> {
        let uploads_dir = public_dir.join("uploads");
        fs::create_dir_all(&uploads_dir).await?;
        info!("Upload directory: {}", uploads_dir.display());
        Ok(Self { uploads_dir })
    }

    /// Validates extension, declared content type and size, then persists the
    /// bytes under a generated name. All checks run before anything touches
    /// the filesystem. Returns the public path (`/uploads/<name>`).
    pub async fn store(
        &self,
        kind: MediaKind,
        original_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<String, UploadError> {
        let ext = extension_of(original_name).ok_or(UploadError::UnsupportedType)?;
        if !ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return Err(UploadError::UnsupportedType);
        }
        if let Some(declared) = content_type {
            if !ALLOWED_EXTENSIONS.iter().any(|t| declared.contains(t)) {
                return Err(UploadError::UnsupportedType);
            }
        }
        if data.len() > kind.max_bytes() {
            return Err(UploadError::TooLarge);
        }

        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        let filename = format!(
            "{}-{}-{}.{}",
            kind.prefix(),
            chrono::Utc::now().timestamp_millis(),
            suffix,
            ext
        );

        fs::write(self.uploads_dir.join(&filename), data).await?;
        info!("Stored upload {} ({} bytes)", filename, data.len());
        Ok(format!("/uploads/{}", filename))
    }

    /// Best-effort removal of a stored upload. Only the final path component
    /// is used, so a stored value can never point outside the uploads
    /// directory. A missing file is not an error; nothing here propagates.
    pub async fn remove(&self, public_path: &str) {
        let name = match Path::new(public_path).file_name() {
            Some(name) => name.to_owned(),
            None => {
                warn!("Upload path '{}' has no file name, skipping removal", public_path);
                return;
            }
        };

        match fs::remove_file(self.uploads_dir.join(&name)).await {
            Ok(()) => info!("Removed upload {}", name.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Upload {} already gone", name.display());
            }
            Err(e) => warn!("Could not remove upload {}: {}", name.display(), e),
        }
    }
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension()?.to_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn test_store() -> (MediaStore, PathBuf) {
        let public_dir = std::env::temp_dir()
            .join("atrio_upload_tests")
            .join(Uuid::new_v4().to_string());
        let store = MediaStore::new(&public_dir).await.unwrap();
        (store, public_dir)
    }

    #[tokio::test]
    async fn store_writes_file_and_remove_deletes_it() {
        let (store, public_dir) = test_store().await;

        let path = store
            .store(MediaKind::Galeria, "foto.png", Some("image/png"), b"png bytes")
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/galeria-"));
        assert!(path.ends_with(".png"));

        let on_disk = public_dir.join("uploads").join(path.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png bytes");

        store.remove(&path).await;
        assert!(!on_disk.exists());

        // Removing twice must not fail
        store.remove(&path).await;
    }

    #[tokio::test]
    async fn rejects_disallowed_extension_before_writing() {
        let (store, public_dir) = test_store().await;

        let result = store
            .store(MediaKind::Noticia, "payload.exe", Some("image/png"), b"MZ")
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));

        let result = store.store(MediaKind::Noticia, "noext", None, b"data").await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));

        let entries: Vec<_> = std::fs::read_dir(public_dir.join("uploads"))
            .unwrap()
            .collect();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn rejects_mismatched_content_type() {
        let (store, _dir) = test_store().await;

        let result = store
            .store(MediaKind::Noticia, "doc.png", Some("application/pdf"), b"%PDF")
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));

        // Absent content type falls back to the extension check
        let ok = store.store(MediaKind::Noticia, "foto.jpg", None, b"jpg").await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn rejects_oversize_payload() {
        let (store, _dir) = test_store().await;

        let too_big = vec![0u8; MediaKind::Noticia.max_bytes() + 1];
        let result = store
            .store(MediaKind::Noticia, "grande.jpg", Some("image/jpeg"), &too_big)
            .await;
        assert!(matches!(result, Err(UploadError::TooLarge)));

        // The same payload is fine under the gallery ceiling
        let ok = store
            .store(MediaKind::Galeria, "grande.jpg", Some("image/jpeg"), &too_big)
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn remove_never_escapes_the_uploads_dir() {
        let (store, public_dir) = test_store().await;

        let decoy = public_dir.join("decoy.txt");
        std::fs::write(&decoy, b"keep me").unwrap();

        store.remove("/uploads/../decoy.txt").await;
        assert!(decoy.exists());

        store.remove("").await;
    }

    #[tokio::test]
    async fn same_original_name_gets_distinct_paths() {
        let (store, _dir) = test_store().await;

        let first = store
            .store(MediaKind::Evento, "cartel.jpg", Some("image/jpeg"), b"a")
            .await
            .unwrap();
        let second = store
            .store(MediaKind::Evento, "cartel.jpg", Some("image/jpeg"), b"b")
            .await
            .unwrap();

        assert_ne!(first, second);
    }
}
