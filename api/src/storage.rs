use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

pub const FIXED_UPLOAD_NAME: &str = "upload.pdf";
pub const PUBLIC_PREFIX: &str = "/uploads";
/// Partial writes live here until they are renamed into the upload directory.
pub const STAGING_DIR: &str = ".staging";

/// How stored uploads are named.
///
/// `Fixed` keeps every upload at `upload.pdf`, so concurrent uploads overwrite
/// each other and the last writer wins. `PerUpload` gives each upload its own
/// uuid-named file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadNaming {
    #[default]
    Fixed,
    PerUpload,
}

impl FromStr for UploadNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "per-upload" | "per_upload" => Ok(Self::PerUpload),
            other => Err(format!("unknown upload naming '{}', expected 'fixed' or 'per-upload'", other)),
        }
    }
}

impl fmt::Display for UploadNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::PerUpload => write!(f, "per-upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub public_path: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    naming: UploadNaming,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, naming: UploadNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Case-insensitive `.pdf` check on the client-supplied file name.
    pub fn is_pdf(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    /// Writes `bytes` to a file under `.staging/` and renames it onto the
    /// target name, keeping the rename on one filesystem.
    pub async fn store(&self, bytes: &[u8]) -> io::Result<StoredUpload> {
        let name = match self.naming {
            UploadNaming::Fixed => FIXED_UPLOAD_NAME.to_string(),
            UploadNaming::PerUpload => format!("{}.pdf", Uuid::new_v4()),
        };

        if !tokio::fs::try_exists(&self.dir).await? {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("upload directory {} does not exist", self.dir.display()),
            ));
        }

        let path = self.dir.join(&name);
        let staging_dir = self.dir.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_dir).await?;
        let staging = staging_dir.join(format!("{}.{}.part", name, Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        log::info!("Stored {} bytes at {}", bytes.len(), path.display());

        Ok(StoredUpload {
            path,
            public_path: format!("{}/{}", PUBLIC_PREFIX, name),
        })
    }

    /// Removes an upload that turned out to be unusable.
    ///
    /// Only per-upload files are removed: their path was never handed to a
    /// client. In fixed mode the file stays, like any other overwrite.
    pub async fn discard(&self, upload: &StoredUpload) {
        if self.naming != UploadNaming::PerUpload {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(&upload.path).await {
            log::warn!("Failed to remove unusable upload {}: {}", upload.path.display(), e);
        }
    }
}
