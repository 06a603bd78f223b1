pub mod client;
pub mod content_type;
pub mod error;
pub mod output;
pub mod upload;

pub use client::{FalClient, FileStore};
pub use content_type::detect_content_type;
pub use error::UploadError;
pub use output::{GITHUB_OUTPUT_KEY, append_github_output, write_url_file};
pub use upload::{MAX_FILE_SIZE, UploadRequest, prepare, send, upload_image};
