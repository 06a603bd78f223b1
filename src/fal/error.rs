use thiserror::Error;

/// Errors that can occur during a fal upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// Credential variable unset or empty
    #[error("{var} not found in environment variables")]
    MissingCredential { var: String },

    /// File not found on local filesystem
    #[error("Image file not found at {path}")]
    FileNotFound { path: String },

    /// File size exceeds maximum allowed
    #[error("File too large ({size} bytes). Maximum {max} bytes allowed.")]
    FileTooLarge { size: u64, max: u64 },

    /// File exists but could not be read
    #[error("Failed to read {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport, HTTP or service error raised by the upload capability
    #[error("Upload request failed: {0}")]
    UploadFailed(String),
}

impl UploadError {
    /// Map an IO error from stat/read into the upload taxonomy
    pub fn from_io_error(error: std::io::Error, path: &str) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_string(),
            },
            _ => Self::ReadFailed {
                path: path.to_string(),
                source: error,
            },
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential { var } => {
                format!(
                    "{}\n\nPossible solutions:\n  \
                     1. Export it: export {}=<your key>\n  \
                     2. Add {}=<your key> to a .env file in the current directory",
                    self, var, var
                )
            }
            Self::FileNotFound { path } => {
                format!(
                    "{}\n\nPossible solutions:\n  \
                     1. Check if the file path is correct\n  \
                     2. Verify the file exists: ls -la {}",
                    self, path
                )
            }
            Self::FileTooLarge { .. } => {
                format!(
                    "{}\n\nPossible solutions:\n  \
                     1. Compress or resize the image before uploading",
                    self
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for fal upload operations
pub type Result<T> = std::result::Result<T, UploadError>;
