//! Error types for the binary and textual scene file boundary.

use thiserror::Error;

/// A failure reading or writing a scene file.
#[derive(Debug, Error)]
pub enum IoError {
    /// The input ended before a field's declared length was satisfied.
    #[error("unexpected end of input while reading {0}")]
    PrematureInput(&'static str),
    /// A magic number, discriminator string, or terminator byte didn't
    /// match what the format requires.
    #[error("invalid header or malformed record while reading {0}")]
    InvalidHeader(&'static str),
    /// The input or output path could not be opened.
    #[error("cannot open {path}: {source}")]
    CannotOpen {
        /// The path that failed to open.
        path: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A face's texture axes aren't an orthonormal pair consistent with
    /// its normal, or a shift isn't a multiple of 16, so it cannot be
    /// written in the legacy `"100"` projection form.
    #[error("face texture cannot be represented in the legacy 100 map format")]
    UnsupportedTextureForLegacyMap,
    /// Any other I/O failure not covered above.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
