use anyhow::Result;
use clap::Parser;
use console::style;
use fal_uploader::fal::{prepare, send, write_url_file};
use fal_uploader::{Config, FalClient, FileStore};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "falpublish",
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload a generated image to fal.ai and save its URL to a file",
    long_about = "Pipeline step: uploads the image produced by an earlier step and writes only \
                  the resulting remote URL to a text file for later steps to pick up.",
    after_help = "Examples:\n  \
                  falpublish                                      # morning-image.png -> fal_url.txt\n  \
                  falpublish -i cover.jpg -o cover_url.txt        # Custom input and output\n\n\
                  Requirements:\n  \
                  - FAL_KEY environment variable (or .env file)"
)]
struct Args {
    /// Image to upload
    #[arg(long, short = 'i', default_value = "morning-image.png")]
    input: PathBuf,

    /// File that receives the remote URL (overwritten)
    #[arg(long, short = 'o', default_value = "fal_url.txt")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    fal_uploader::init_tracing("warn");

    let args = Args::parse();
    let mut stdout = std::io::stdout();

    let result: Result<String> = async {
        let config = Config::from_env()?;
        let client = FalClient::new(&config)?;
        publish(&config, &client, &args.input, &args.output, &mut stdout).await
    }
    .await;

    if let Err(e) = result {
        writeln!(stdout, "{}", style(format!("Error: {:#}", e)).red().bold())?;
        std::process::exit(1);
    }

    Ok(())
}

/// Upload `input` and persist the URL to `output`
async fn publish<S: FileStore, W: Write>(
    config: &Config,
    store: &S,
    input: &Path,
    output: &Path,
    out: &mut W,
) -> Result<String> {
    let request = prepare(config, input).await?;
    writeln!(out, "{}", style("Uploading to FAL...").cyan())?;

    let url = send(store, request).await?;
    writeln!(out, "Upload successful: {}", url)?;

    write_url_file(output, &url).await?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Hands out a new URL per call
    #[derive(Default)]
    struct CountingStore {
        seen: Mutex<Vec<String>>,
    }

    impl FileStore for CountingStore {
        async fn upload(&self, _data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(content_type.to_string());
            Ok(format!("https://cdn.example/{}.png", seen.len()))
        }
    }

    fn config() -> Config {
        Config {
            fal_key: "k".to_string(),
            rest_url: "https://rest.example".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_default_paths() {
        let args = Args::try_parse_from(["falpublish"]).unwrap();
        assert_eq!(args.input, PathBuf::from("morning-image.png"));
        assert_eq!(args.output, PathBuf::from("fal_url.txt"));
    }

    #[tokio::test]
    async fn test_publish_writes_url_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("morning-image.png");
        let output = dir.path().join("fal_url.txt");
        std::fs::write(&input, b"img").unwrap();
        let store = CountingStore::default();
        let mut out = Vec::new();

        let url = publish(&config(), &store, &input, &output, &mut out)
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example/1.png");
        assert_eq!(std::fs::read_to_string(&output).unwrap(), url);
        assert_eq!(*store.seen.lock().unwrap(), vec!["image/png"]);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Upload successful: https://cdn.example/1.png"));
    }

    #[tokio::test]
    async fn test_publish_overwrites_previous_url() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("morning-image.png");
        let output = dir.path().join("fal_url.txt");
        std::fs::write(&input, b"img").unwrap();
        let store = CountingStore::default();

        publish(&config(), &store, &input, &output, &mut Vec::<u8>::new())
            .await
            .unwrap();
        publish(&config(), &store, &input, &output, &mut Vec::<u8>::new())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "https://cdn.example/2.png"
        );
    }

    #[tokio::test]
    async fn test_missing_input_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("morning-image.png");
        let output = dir.path().join("fal_url.txt");
        let store = CountingStore::default();

        let mut out = Vec::new();

        let err = publish(&config(), &store, &input, &output, &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert!(!output.exists());
        assert!(store.seen.lock().unwrap().is_empty());
        assert!(!String::from_utf8(out).unwrap().contains("Uploading to FAL"));
    }

    #[tokio::test]
    async fn test_checks_run_before_announcing_upload() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("morning-image.png");
        let output = dir.path().join("fal_url.txt");
        std::fs::write(&input, b"img").unwrap();
        let store = CountingStore::default();
        let config = Config {
            fal_key: String::new(),
            ..config()
        };
        let mut out = Vec::<u8>::new();

        let err = publish(&config, &store, &input, &output, &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("FAL_KEY"));
        assert!(out.is_empty());
        assert!(store.seen.lock().unwrap().is_empty());
    }
}
