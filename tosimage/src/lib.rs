//! # tosimage
//!
//! Builds trusted OS partition images: the raw payload prefixed with the
//! 512-byte `NVTOSP` header the bootloader looks for.
//!
//! ## Example
//!
//! ```rust
//! use tosimage::{frame_bytes, TosImage, TOS_HEADER_SIZE};
//!
//! let image = frame_bytes(&[0xde, 0xad, 0xbe, 0xef])?;
//! assert_eq!(image.len(), TOS_HEADER_SIZE + 4);
//!
//! let parsed = TosImage::parse(&image)?;
//! assert_eq!(parsed.payload(), b"\xde\xad\xbe\xef");
//! # Ok::<(), tosimage::TosImageError>(())
//! ```

#[macro_use]
extern crate log;

pub mod cli;
pub mod error;
pub mod framer;
pub mod header;

pub use error::{Result, TosImageError};
pub use framer::{FrameReport, TosImage, frame, frame_bytes, set_output_permissions};
pub use header::TosHeader;

/// Current version of the tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Magic text at the start of every header, NUL included
pub const TOS_MAGIC: &[u8] = b"NVTOSP\0";

/// Fixed header size
pub const TOS_HEADER_SIZE: usize = 512;

/// Room reserved for the magic and decimal size text
pub const TOS_PREFIX_MAX: usize = 20;

/// Value of the format tag field
pub const TOS_FORMAT_VERSION: u32 = 5;
