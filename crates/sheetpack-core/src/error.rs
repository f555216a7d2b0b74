use thiserror::Error;

use crate::verify::SanityError;

#[derive(Debug, Error)]
pub enum SheetPackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
    #[error("Estimated sheet size {estimate}px exceeds the maximum of {max}px")]
    SheetTooLarge { estimate: u64, max: u32 },
    #[error("Metadata encoding error: {0}")]
    Encode(String),
    #[error("Metadata decoding error: {0}")]
    Decode(String),
    #[error("Sanity check failed: {0}")]
    Sanity(#[from] SanityError),
}

pub type Result<T> = std::result::Result<T, SheetPackError>;
