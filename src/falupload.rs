use anyhow::Result;
use clap::Parser;
use console::style;
use fal_uploader::fal::{GITHUB_OUTPUT_KEY, append_github_output, prepare, send, write_url_file};
use fal_uploader::{Config, FalClient, FileStore, UploadError};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "falupload",
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload an image to the fal.ai CDN and print its remote URL",
    long_about = "Reads an image from disk, checks it is under 100MB, infers its Content-Type \
                  from the extension and uploads it to fal.ai storage. Configure via .env file \
                  or environment with FAL_KEY.",
    after_help = "Examples:\n  \
                  falupload ./photo.png                   # Upload and print the URL\n  \
                  falupload ./photo.jpg -o url.txt        # Also write the URL to url.txt\n\n\
                  Configuration (.env):\n  \
                  FAL_KEY=your-key\n  \
                  FAL_UPLOAD_TIMEOUT_SECS=60\n\n\
                  When GITHUB_OUTPUT is set the URL is also appended as fal-url=<url>."
)]
struct Cli {
    /// Image file to upload
    image_path: Option<PathBuf>,

    /// Also write the remote URL to this file
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

/// Where a successful URL is persisted besides stdout
#[derive(Debug, Default)]
struct Sinks {
    output: Option<PathBuf>,
    github_output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();
    fal_uploader::init_tracing("warn");

    let cli = Cli::parse();
    let mut stdout = std::io::stdout();

    let Some(image_path) = require_image_path(cli.image_path, &mut stdout)? else {
        std::process::exit(1);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            writeln!(stdout, "{}", style(format!("Error: {:#}", e)).red())?;
            writeln!(stdout, "\n{}", style("❌ Upload failed").red().bold())?;
            std::process::exit(1);
        }
    };
    let client = FalClient::new(&config)?;

    let sinks = Sinks {
        output: cli.output,
        github_output: std::env::var_os("GITHUB_OUTPUT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
    };

    let code = run(&config, &client, &image_path, &sinks, &mut stdout).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Print usage and yield `None` when no image path was given
fn require_image_path<W: Write>(
    image_path: Option<PathBuf>,
    out: &mut W,
) -> Result<Option<PathBuf>> {
    if image_path.is_none() {
        writeln!(out, "Usage: falupload <image_path>")?;
    }
    Ok(image_path)
}

/// Upload one image, printing progress and the outcome to `out`
///
/// Returns the process exit code.
async fn run<S: FileStore, W: Write>(
    config: &Config,
    store: &S,
    image_path: &Path,
    sinks: &Sinks,
    out: &mut W,
) -> Result<i32> {
    match upload(config, store, image_path, sinks, out).await {
        Ok(url) => {
            writeln!(
                out,
                "\n{}",
                style(format!("✅ Success: {}", url)).green().bold()
            )?;
            Ok(0)
        }
        Err(e) => {
            let message = match e.downcast_ref::<UploadError>() {
                Some(upload_error) => upload_error.user_message(),
                None => format!("{:#}", e),
            };
            writeln!(out, "{}", style(format!("Error: {}", message)).red())?;
            writeln!(out, "\n{}", style("❌ Upload failed").red().bold())?;
            Ok(1)
        }
    }
}

async fn upload<S: FileStore, W: Write>(
    config: &Config,
    store: &S,
    image_path: &Path,
    sinks: &Sinks,
    out: &mut W,
) -> Result<String> {
    let request = prepare(config, image_path).await?;

    writeln!(
        out,
        "Uploading image: {} ({} bytes)",
        style(request.file_name()).cyan(),
        request.size()
    )?;

    let url = send(store, request).await?;

    writeln!(out, "{}", style("Upload successful!").green())?;
    writeln!(out, "Remote URL: {}", url)?;

    if let Some(path) = &sinks.output {
        write_url_file(path, &url).await?;
    }
    if let Some(path) = &sinks.github_output {
        append_github_output(path, GITHUB_OUTPUT_KEY, &url).await?;
    }

    Ok(url)
}
