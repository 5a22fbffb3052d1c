use futures::future::join_all;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::errors::UploadError;
use crate::http_client::HttpClient;

const CLIENT_TIMEOUT_DEFAULT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    CLIENT_TIMEOUT_DEFAULT_SECS
}

/// Destination of the uploads.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadSettings {
    /// Base URL of the object store bucket
    pub endpoint: String,
    /// Optional key prefix placed before the session directory name
    #[serde(default)]
    pub prefix: Option<String>,
    /// Sent as a bearer token when present
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UploadSettings {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            prefix: None,
            token: None,
            timeout_secs: CLIENT_TIMEOUT_DEFAULT_SECS,
        }
    }
}

/// Outcome of a successful upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadReport {
    pub directory: PathBuf,
    /// Object keys written, sorted by file name
    pub uploaded: Vec<String>,
}

/// Sends finished session directories to the configured endpoint.
pub struct UploadRelay {
    client: Arc<HttpClient>,
    prefix: Option<String>,
}

impl UploadRelay {
    /// Returns a ClientBuild error if the HTTP client cannot be created.
    pub fn new(settings: &UploadSettings) -> Result<Self, UploadError> {
        let client = HttpClient::new(
            &settings.endpoint,
            settings.token.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self {
            client: Arc::new(client),
            prefix: settings.prefix.clone(),
        })
    }

    /// Uploads every regular file directly inside `directory` on a background task.
    /// All files are attempted; the task fails with the keys that could not be stored.
    pub fn upload(&self, directory: impl Into<PathBuf>) -> JoinHandle<Result<UploadReport, UploadError>> {
        let client = self.client.clone();
        let prefix = self.prefix.clone();
        let directory = directory.into();
        tokio::spawn(async move { upload_directory(&client, prefix.as_deref(), directory).await })
    }
}

/// Key under which `file_name` of session `dir_name` is stored.
///
/// ```
/// use uploader_rs::object_key;
///
/// assert_eq!(object_key(Some("lab/"), "2024_03_07_09_05_02", "gyroscope.csv"),
///            "lab/2024_03_07_09_05_02/gyroscope.csv");
/// assert_eq!(object_key(None, "2024_03_07_09_05_02", "gyroscope.csv"),
///            "2024_03_07_09_05_02/gyroscope.csv");
/// ```
pub fn object_key(prefix: Option<&str>, dir_name: &str, file_name: &str) -> String {
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{prefix}/{dir_name}/{file_name}"),
        None => format!("{dir_name}/{file_name}"),
    }
}

async fn upload_directory(
    client: &HttpClient,
    prefix: Option<&str>,
    directory: PathBuf,
) -> Result<UploadReport, UploadError> {
    let invalid = |reason: &str| UploadError::InvalidPath(format!("{}: {}", directory.display(), reason));

    let metadata = tokio::fs::metadata(&directory)
        .await
        .map_err(|e| invalid(&e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory"));
    }
    let dir_name = directory
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| invalid("no directory name"))?
        .to_string();

    let files = list_files(&directory)
        .await
        .map_err(|e| invalid(&e.to_string()))?;

    let uploads = files.iter().map(|(file_name, path)| {
        let key = object_key(prefix, &dir_name, file_name);
        async move {
            let result = match tokio::fs::read(path).await {
                Ok(body) => client.put(&key, body).await,
                Err(e) => Err(e.to_string()),
            };
            (key, result)
        }
    });

    let mut uploaded = Vec::with_capacity(files.len());
    let mut failed = Vec::new();
    for (key, result) in join_all(uploads).await {
        match result {
            Ok(()) => {
                log::debug!("Uploaded {}", key);
                uploaded.push(key);
            }
            Err(e) => {
                log::error!("Error uploading {}: {}", key, e);
                failed.push(key);
            }
        }
    }

    if !failed.is_empty() {
        return Err(UploadError::Upload(failed));
    }
    log::info!("Uploaded {} files from {}", uploaded.len(), directory.display());
    Ok(UploadReport {
        directory,
        uploaded,
    })
}

/// Regular files directly inside `directory`, sorted by name.
async fn list_files(directory: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push((name.to_string(), entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_ignores_empty_prefix() {
        assert_eq!(object_key(Some(""), "s", "a.csv"), "s/a.csv");
        assert_eq!(object_key(Some("/"), "s", "a.csv"), "s/a.csv");
        assert_eq!(object_key(Some("/bucket/lab/"), "s", "a.csv"), "bucket/lab/s/a.csv");
    }

    #[test]
    fn test_settings_defaults() {
        let settings = UploadSettings::new("http://localhost");
        assert_eq!(settings.timeout_secs, 30);
        assert!(settings.prefix.is_none());
        assert!(settings.token.is_none());
    }

    #[tokio::test]
    async fn test_relay_new() {
        UploadRelay::new(&UploadSettings::new("http://localhost")).expect("Error creating relay");
    }
}
