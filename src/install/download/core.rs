//! Cached HTTP download with progress reporting

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::install::error::SetupError;

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

/// Last path segment of `url`, used as the cached file name.
pub fn file_name_from_url(url: &str) -> Result<String, SetupError> {
    let parsed = url::Url::parse(url).map_err(|e| SetupError::Download {
        url: url.to_string(),
        reason: format!("invalid URL: {e}"),
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SetupError::Download {
            url: url.to_string(),
            reason: "URL has no file name".to_string(),
        })
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// Returns `true` when a download happened. Bytes are streamed to a `.part`
/// sibling and renamed on completion, so an interrupted run never leaves a
/// truncated file that looks cached.
pub async fn ensure_downloaded(url: &str, dest: &Path) -> Result<bool, SetupError> {
    if tokio::fs::try_exists(dest).await? {
        info!("Using cached {}", dest.display());
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part_path = part_path(dest);
    download_to(url, &part_path).await?;
    tokio::fs::rename(&part_path, dest).await?;

    info!("Downloaded {} to {}", url, dest.display());
    Ok(true)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn download_to(url: &str, path: &Path) -> Result<(), SetupError> {
    let fail = |reason: String| SetupError::Download {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(concat!("zano-setup/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fail(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let total_bytes = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:50.green/blue}] {bytes}/{total_bytes}  {msg}")
            .map_err(|e| SetupError::System(format!("Invalid progress bar template: {e}")))?
            .progress_chars("█▓░"),
    );
    pb.set_message(file_name_from_url(url).unwrap_or_else(|_| url.to_string()));

    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => {
                pb.abandon();
                return Err(fail(e.to_string()));
            }
            Ok(None) => break,
            Err(_) => {
                pb.abandon();
                return Err(fail(format!(
                    "no data received for {} seconds ({} bytes downloaded)",
                    DOWNLOAD_INACTIVITY_TIMEOUT.as_secs(),
                    downloaded
                )));
            }
        };

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush().await?;
    file.sync_all().await?;
    pb.finish_and_clear();

    if total_bytes > 0 && downloaded != total_bytes {
        return Err(fail(format!(
            "truncated download: {downloaded} of {total_bytes} bytes"
        )));
    }

    Ok(())
}
