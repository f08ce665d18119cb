//! Model locating, downloading and loading utilities.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use memmap2::Mmap;
use ort::session::Session;

use crate::error::{Error, Result};

use super::OrtEngine;

/// File name of the classifier model inside the model directory.
pub const MODEL_FILENAME: &str = "animals.onnx";

/// Approximate model size, used for the progress bar when the server does not
/// send a content length.
const APPROX_MODEL_SIZE: u64 = 1_500_000;

/// Where the model bytes come from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// A model file on disk; it is memory-mapped rather than read.
    File(PathBuf),
    /// Model bytes already in memory.
    Memory(Vec<u8>),
}

impl ModelSource {
    fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// Load the model into an ONNX Runtime session.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or mapped, or if ONNX Runtime
/// rejects the model.
pub fn load_model(source: &ModelSource) -> Result<OrtEngine> {
    let name = source.name();
    tracing::info!("Loading model {name}");

    let session = match source {
        ModelSource::File(path) => {
            let file = fs::File::open(path)?;
            // SAFETY: the mapping is read-only and dropped as soon as the
            // session has been built from it.
            let data = unsafe { Mmap::map(&file)? };
            commit(&name, &data)?
        }
        ModelSource::Memory(bytes) => commit(&name, bytes)?,
    };

    Ok(OrtEngine::new(name, session))
}

fn commit(name: &str, bytes: &[u8]) -> Result<Session> {
    Session::builder()
        .map_err(|source| Error::ModelLoad {
            name: name.to_string(),
            source,
        })?
        .commit_from_memory(bytes)
        .map_err(|source| Error::ModelLoad {
            name: name.to_string(),
            source,
        })
}

/// Manages the directory the model lives in and fetching it there.
pub struct ModelCache {
    model_dir: PathBuf,
}

impl ModelCache {
    /// Create a model cache in the platform data directory.
    ///
    /// - Windows: `%APPDATA%\animal-classifier\models`
    /// - Linux: `~/.local/share/animal-classifier/models`
    /// - macOS: `~/Library/Application Support/animal-classifier/models`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_dir(base.join("animal-classifier").join("models"))
    }

    /// Create a model cache rooted at `model_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_dir(model_dir: impl Into<PathBuf>) -> Result<Self> {
        let model_dir = model_dir.into();

        fs::create_dir_all(&model_dir).map_err(|source| Error::CacheDir {
            path: model_dir.clone(),
            source,
        })?;

        Ok(Self { model_dir })
    }

    /// Where the model is, or would be, stored.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILENAME)
    }

    /// Get the path to the model file, downloading it from `url` if it is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] if the file is missing and no URL was
    /// given, or an error if the download fails.
    pub fn resolve(&self, url: Option<&str>) -> Result<PathBuf> {
        let path = self.model_path();

        if path.exists() {
            return Ok(path);
        }

        match url {
            Some(url) => {
                download_file(url, &path, MODEL_FILENAME, APPROX_MODEL_SIZE)?;
                Ok(path)
            }
            None => Err(Error::ModelNotFound { path }),
        }
    }
}

/// Download a file from a URL to a path with progress indication.
fn download_file(url: &str, path: &Path, name: &str, approx_size: u64) -> Result<()> {
    tracing::info!("Downloading {name} from {url}");

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|source| Error::ModelDownload {
            name: name.to_string(),
            source,
        })?;

    let total_size = response.content_length().unwrap_or(approx_size);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {name}"));

    save_stream(response, path, &pb)?;

    pb.finish_with_message(format!("Downloaded {name}"));

    Ok(())
}

/// Copy `reader` to `path` through a `.tmp` sibling, then rename it into place.
///
/// A partial download is never mistaken for the model: on any error the
/// temporary file is removed and `path` is left untouched.
fn save_stream<R: Read>(reader: R, path: &Path, pb: &ProgressBar) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let result = write_to(reader, &temp_path, pb).and_then(|()| {
        fs::rename(&temp_path, path)?;
        Ok(())
    });

    if result.is_err() {
        // Ignore: the file may never have been created
        let _ = fs::remove_file(&temp_path);
    }

    result
}

#[allow(clippy::cast_possible_truncation)]
fn write_to<R: Read>(mut reader: R, temp_path: &Path, pb: &ProgressBar) -> Result<()> {
    let mut file = fs::File::create(temp_path)?;

    let mut downloaded = 0u64;
    loop {
        let mut buffer = [0u8; 8192];
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;
        pb.set_position(downloaded);
    }
    file.flush()?;

    Ok(())
}
