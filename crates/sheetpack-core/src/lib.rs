//! Core library for packing sprite frames into a single sheet.
//!
//! - Placement: one free-rectangle list seeded with an estimated square,
//!   best-fit selection, guillotine-style subdivision, edge merging and
//!   on-demand growth of the canvas
//! - Pipeline: `pack_frames` places, composes and encodes in one call;
//!   `pack_layout` computes positions only
//! - Output: RGBA sheet cropped to the placed sprites, the binary `obLT`
//!   placement block and optional JSON descriptions
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use sheetpack_core::{FrameSet, InputFrame, PackerConfig, pack_frames};
//! # fn main() -> anyhow::Result<()> {
//! let mut frames = FrameSet::new();
//! frames.push(InputFrame::from_dynamic("a", &ImageReader::open("a.png")?.decode()?));
//! frames.push(InputFrame::from_dynamic("b", &ImageReader::open("b.png")?.decode()?));
//! let out = pack_frames(&frames, &PackerConfig::default())?;
//! println!("{}x{}, {} unplaced", out.sheet.width(), out.sheet.height(), out.layout.unplaced.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod estimate;
pub mod export;
pub mod frame;
pub mod metadata;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod verify;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use estimate::*;
pub use export::*;
pub use frame::*;
pub use metadata::{MetadataEntry, SheetMetadata, decode_metadata, encode_metadata};
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use verify::*;

/// Convenience prelude for common types and functions.
/// Importing `sheetpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder};
    pub use crate::frame::{FrameSet, FrameSource, InputFrame};
    pub use crate::metadata::{SheetMetadata, decode_metadata, encode_metadata};
    pub use crate::model::{FreeRect, PackStats, Rect, SheetLayout, SheetSize, Sprite};
    pub use crate::packer::{DebugColors, Palette};
    pub use crate::{
        PackOutput, SheetPackError, compose_sheet, pack, pack_frames, pack_frames_with,
        pack_layout, place_sprites,
    };
}
