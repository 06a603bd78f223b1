use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Key written to the GitHub Actions output file
pub const GITHUB_OUTPUT_KEY: &str = "fal-url";

/// Overwrite `path` with the URL and nothing else
pub async fn write_url_file(path: &Path, url: &str) -> Result<()> {
    tokio::fs::write(path, url)
        .await
        .with_context(|| format!("Failed to write URL to {}", path.display()))
}

/// Append `key=url` to a GitHub Actions output file
pub async fn append_github_output(path: &Path, key: &str, url: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open GitHub output file {}", path.display()))?;

    file.write_all(format!("{}={}\n", key, url).as_bytes())
        .await
        .with_context(|| format!("Failed to append to {}", path.display()))?;
    file.flush().await?;

    Ok(())
}
