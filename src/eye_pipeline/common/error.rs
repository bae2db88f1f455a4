use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalizationError {
    #[error("Invalid input raster: {0}")]
    InvalidInput(String),

    #[error("Crop of {top} top / {bottom} bottom rows leaves no rows of a {height}-row plane")]
    InvalidRegion {
        top: usize,
        bottom: usize,
        height: usize,
    },

    #[error("Mask has zero total weight, no foreground survived thresholding")]
    DegenerateMask,

    #[error("Invalid threshold configuration: {0}")]
    InvalidConfig(String),

    #[error("Region detector failed: {0}")]
    Detection(String),

    #[error("Failed to decode TIFF image: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
