//! Metadata extraction for stored videos.
//!
//! Given a URL ffmpeg can read, this module produces a single still frame
//! (the thumbnail) and a format-level probe of the container.
//!
//! # Example
//!
//! ```ignore
//! use zesha_core::extractor::{FfmpegExtractor, MetadataExtractor, THUMBNAIL_OFFSET};
//!
//! let extractor = FfmpegExtractor::with_defaults();
//! extractor.validate().await?;
//!
//! let frame = extractor
//!     .extract_thumbnail(url, THUMBNAIL_OFFSET, Path::new("public/thumbnail-1.jpg"))
//!     .await?;
//! let format = extractor.probe_format(url).await?;
//! println!("{:?} seconds of {:?}", format.duration, format.format_name);
//! ```

mod error;
mod ffmpeg;
mod traits;
mod types;

pub use error::ExtractorError;
pub use ffmpeg::FfmpegExtractor;
pub use traits::MetadataExtractor;
pub use types::{FormatInfo, MetadataRecord, THUMBNAIL_OFFSET};
