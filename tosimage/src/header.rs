//! NVTOSP header layout and serialization

use crate::error::{Result, TosImageError};
use crate::{TOS_FORMAT_VERSION, TOS_HEADER_SIZE, TOS_MAGIC, TOS_PREFIX_MAX};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Read;

/// Offset of the first binary size field
pub const SIZE_OFFSET: usize = TOS_PREFIX_MAX;
/// Offset of the duplicated size field
pub const SIZE_COPY_OFFSET: usize = SIZE_OFFSET + 4;
/// Offset of the reserved field
pub const RESERVED_OFFSET: usize = SIZE_COPY_OFFSET + 4;
/// Offset of the format tag
pub const VERSION_OFFSET: usize = RESERVED_OFFSET + 4;
/// End of the populated fields, zero padding follows up to `TOS_HEADER_SIZE`
pub const FIELDS_END: usize = VERSION_OFFSET + 4;

const _: () = assert!(FIELDS_END <= TOS_HEADER_SIZE);

/// Trusted OS partition header
///
/// Only the payload size varies between images. `reserved` and `version`
/// are kept so parsed headers can be checked against the expected values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TosHeader {
    /// Payload length in bytes
    pub size: u32,
    /// Reserved field, always zero
    pub reserved: u32,
    /// Format tag
    pub version: u32,
}

impl TosHeader {
    /// Build the header for a payload of `len` bytes.
    ///
    /// Fails before anything is packed if the decimal size text does not fit
    /// the reserved prefix region, or if `len` does not fit the u32 size fields.
    pub fn for_payload_len(len: u64) -> Result<Self> {
        let prefix_len = Self::prefix(len).len();
        if prefix_len > TOS_PREFIX_MAX {
            return Err(TosImageError::HeaderOverflow {
                prefix_len,
                max: TOS_PREFIX_MAX,
            });
        }

        let size = u32::try_from(len).map_err(|_| TosImageError::PayloadTooLarge {
            size: len,
            max: u32::MAX as u64,
        })?;

        Ok(Self {
            size,
            reserved: 0,
            version: TOS_FORMAT_VERSION,
        })
    }

    /// Magic, decimal payload size and terminating NUL.
    pub fn prefix(len: u64) -> Vec<u8> {
        let digits = len.to_string();
        let mut prefix = Vec::with_capacity(TOS_MAGIC.len() + digits.len() + 1);
        prefix.extend_from_slice(TOS_MAGIC);
        prefix.extend_from_slice(digits.as_bytes());
        prefix.push(0);
        prefix
    }

    /// Serialize the header into its 512-byte form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let prefix = Self::prefix(self.size as u64);
        if prefix.len() > TOS_PREFIX_MAX {
            return Err(TosImageError::HeaderOverflow {
                prefix_len: prefix.len(),
                max: TOS_PREFIX_MAX,
            });
        }

        let mut buffer = vec![0u8; TOS_HEADER_SIZE];
        buffer[..prefix.len()].copy_from_slice(&prefix);
        LittleEndian::write_u32(&mut buffer[SIZE_OFFSET..], self.size);
        LittleEndian::write_u32(&mut buffer[SIZE_COPY_OFFSET..], self.size);
        LittleEndian::write_u32(&mut buffer[RESERVED_OFFSET..], self.reserved);
        LittleEndian::write_u32(&mut buffer[VERSION_OFFSET..], self.version);

        debug!(
            "header: prefix {} bytes, size {}, version {}",
            prefix.len(),
            self.size,
            self.version
        );
        Ok(buffer)
    }

    /// Parse and validate a header from the start of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < TOS_HEADER_SIZE {
            return Err(TosImageError::invalid_header(format!(
                "header data too short: {} bytes (expected at least {})",
                data.len(),
                TOS_HEADER_SIZE
            )));
        }
        let data = &data[..TOS_HEADER_SIZE];

        if !data.starts_with(TOS_MAGIC) {
            return Err(TosImageError::invalid_header("missing NVTOSP magic"));
        }

        let text = &data[TOS_MAGIC.len()..TOS_PREFIX_MAX];
        let digits_len = text
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| TosImageError::invalid_header("size text is not terminated"))?;
        let text_size: u64 = std::str::from_utf8(&text[..digits_len])
            .ok()
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| TosImageError::invalid_header("size text is not a decimal number"))?;

        let size = LittleEndian::read_u32(&data[SIZE_OFFSET..]);
        let size_copy = LittleEndian::read_u32(&data[SIZE_COPY_OFFSET..]);
        let reserved = LittleEndian::read_u32(&data[RESERVED_OFFSET..]);
        let version = LittleEndian::read_u32(&data[VERSION_OFFSET..]);

        if size != size_copy {
            return Err(TosImageError::invalid_header(format!(
                "size fields disagree: {size} != {size_copy}"
            )));
        }
        if text_size != size as u64 {
            return Err(TosImageError::invalid_header(format!(
                "size text {text_size} does not match size field {size}"
            )));
        }
        if reserved != 0 {
            return Err(TosImageError::invalid_header(format!(
                "reserved field is {reserved:#x}"
            )));
        }
        if version != TOS_FORMAT_VERSION {
            return Err(TosImageError::invalid_header(format!(
                "unknown format version {version}"
            )));
        }

        let pad_a = &data[TOS_MAGIC.len() + digits_len..TOS_PREFIX_MAX];
        if pad_a.iter().chain(&data[FIELDS_END..]).any(|&b| b != 0) {
            return Err(TosImageError::invalid_header("padding is not zeroed"));
        }

        Ok(Self {
            size,
            reserved,
            version,
        })
    }

    /// Read the header from a reader
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header_data = vec![0u8; TOS_HEADER_SIZE];
        reader
            .read_exact(&mut header_data)
            .map_err(|e| TosImageError::invalid_header(format!("read failed: {e}")))?;
        Self::from_bytes(&header_data)
    }

    /// Header plus payload length
    pub fn total_size(&self) -> u64 {
        TOS_HEADER_SIZE as u64 + self.size as u64
    }

    pub fn summary(&self) -> String {
        format!(
            "Trusted OS image (format {})\n\
             Payload: {} bytes\n\
             Image: {} bytes",
            self.version,
            self.size,
            self.total_size()
        )
    }
}
