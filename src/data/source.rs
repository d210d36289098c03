use std::path::{Path, PathBuf};

use anyhow::Context;
use reqwest::blocking::Client;

use super::error::{Attempt, Diagnostic, LoadError};
use super::loader::{self, DataFormat};
use super::model::Dataset;

/// Environment variable holding an optional remote URL for the dataset.
pub const DATA_URL_ENV: &str = "DATA_CSV_URL";

/// File name probed in every local candidate directory.
pub const DATA_FILE_NAME: &str = "vehicles_us.csv";

// ---------------------------------------------------------------------------
// Source strategies
// ---------------------------------------------------------------------------

/// One place the dataset may come from.
pub trait DatasetSource {
    /// Path or URL, used in logs and diagnostics.
    fn location(&self) -> String;

    /// `Ok(None)` means the source does not exist and the next one should be
    /// tried without recording an error.
    fn load(&self) -> Result<Option<Dataset>, LoadError>;
}

/// Dataset fetched over HTTP(S).
pub struct RemoteSource {
    url: String,
    client: Client,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        RemoteSource {
            url: url.into(),
            client,
        }
    }

    fn fetch(&self) -> anyhow::Result<Dataset> {
        let parsed = reqwest::Url::parse(&self.url).context("invalid URL")?;
        let format = DataFormat::from_path(parsed.path());

        let response = self
            .client
            .get(parsed)
            .send()
            .context("sending request")?
            .error_for_status()?;
        let body = response.bytes().context("reading response body")?;

        match format {
            DataFormat::Parquet => loader::read_parquet(&self.url, body),
            DataFormat::Json => {
                let text = std::str::from_utf8(&body).context("response is not UTF-8")?;
                loader::read_json(&self.url, text)
            }
            DataFormat::Csv => loader::read_csv(&self.url, &body[..]),
        }
    }
}

impl DatasetSource for RemoteSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<Option<Dataset>, LoadError> {
        log::info!("loading dataset from URL ({DATA_URL_ENV})…");
        self.fetch()
            .map(Some)
            .map_err(|e| LoadError::RemoteFetchFailed {
                url: self.url.clone(),
                reason: format!("{e:#}"),
            })
    }
}

/// Dataset file on the local filesystem.
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalFile { path: path.into() }
    }
}

impl DatasetSource for LocalFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Dataset>, LoadError> {
        if !self.path.exists() {
            return Ok(None);
        }
        loader::load_file(&self.path)
            .map(Some)
            .map_err(|e| LoadError::LocalPathUnreadable {
                path: self.path.clone(),
                reason: format!("{e:#}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Try each source in order and return the first table that loads.
///
/// Absent sources and failures are accumulated for the diagnostic; nothing
/// after the first success is consulted.
pub fn resolve(sources: &[Box<dyn DatasetSource>]) -> Result<Dataset, Vec<Attempt>> {
    let mut attempts = Vec::with_capacity(sources.len());

    for source in sources {
        let location = source.location();
        match source.load() {
            Ok(Some(dataset)) => {
                log::info!("dataset loaded from: {location}");
                return Ok(dataset);
            }
            Ok(None) => {
                log::debug!("no dataset at {location}");
                attempts.push(Attempt {
                    location,
                    error: None,
                });
            }
            Err(e) => {
                log::warn!("{e}; trying the next location");
                let reason = match e {
                    LoadError::RemoteFetchFailed { reason, .. }
                    | LoadError::LocalPathUnreadable { reason, .. } => reason,
                    other => other.to_string(),
                };
                attempts.push(Attempt {
                    location,
                    error: Some(reason),
                });
            }
        }
    }

    Err(attempts)
}

// ---------------------------------------------------------------------------
// Loader configuration
// ---------------------------------------------------------------------------

/// Where to look for the dataset.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Remote URL tried first, if any. Never empty.
    pub remote_url: Option<String>,
    pub file_name: String,
    /// Directory of the running executable.
    pub app_dir: PathBuf,
    pub cwd: PathBuf,
}

impl LoaderConfig {
    /// Config for the running process with an explicit remote hint.
    /// A blank hint disables the remote source.
    pub fn discover(source_hint: Option<&str>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let app_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.clone());

        LoaderConfig {
            remote_url: normalize_hint(source_hint),
            file_name: DATA_FILE_NAME.to_string(),
            app_dir,
            cwd,
        }
    }

    /// Local candidates, in probing order.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let parent = self.app_dir.parent().unwrap_or(&self.app_dir);
        vec![
            self.app_dir.join(&self.file_name),
            self.app_dir.join("src").join(&self.file_name),
            parent.join(&self.file_name),
            self.cwd.join(&self.file_name),
        ]
    }

    /// The full ordered source chain: remote first (when configured), then
    /// every local candidate.
    pub fn sources(&self) -> Vec<Box<dyn DatasetSource>> {
        let mut sources: Vec<Box<dyn DatasetSource>> = Vec::new();
        if let Some(url) = &self.remote_url {
            sources.push(Box::new(RemoteSource::new(url.clone())));
        }
        for path in self.candidate_paths() {
            sources.push(Box::new(LocalFile::new(path)));
        }
        sources
    }

    /// Resolve the dataset through [`Self::sources`].
    pub fn load(&self) -> Result<Dataset, LoadError> {
        self.load_from(&self.sources())
    }

    /// Resolve through an explicit source chain, reporting failures against
    /// this config's directories.
    pub fn load_from(&self, sources: &[Box<dyn DatasetSource>]) -> Result<Dataset, LoadError> {
        resolve(sources).map_err(|attempts| {
            LoadError::DataUnavailable(Diagnostic {
                file_name: self.file_name.clone(),
                attempts,
                cwd: self.cwd.clone(),
                app_dir: self.app_dir.clone(),
            })
        })
    }
}

fn normalize_hint(hint: Option<&str>) -> Option<String> {
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

/// Resolve the dataset for the running process. A non-empty `source_hint`
/// is tried as a remote URL before the local candidates.
pub fn load_dataset(source_hint: Option<&str>) -> Result<Dataset, LoadError> {
    LoaderConfig::discover(source_hint).load()
}
