use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the core espfit library.
    #[error("Fit error: {0}")]
    Fit(#[from] espfit::EspFitError),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors parsing XYZ geometry input.
    #[error("Failed to parse XYZ from '{path}': {details}")]
    XyzParse { path: String, details: String },

    /// Errors parsing cube volumetric input.
    #[error("Failed to parse cube file '{path}': {details}")]
    CubeParse { path: String, details: String },
}
