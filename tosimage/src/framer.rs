//! Header framing: header construction plus payload concatenation

use crate::error::{Result, TosImageError};
use crate::header::TosHeader;
use crate::TOS_HEADER_SIZE;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sizes of a freshly written image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub payload_size: u64,
    pub image_size: u64,
}

/// Frame an in-memory payload.
///
/// Returns the 512-byte header followed by `payload`.
pub fn frame_bytes(payload: &[u8]) -> Result<Vec<u8>> {
    let header = TosHeader::for_payload_len(payload.len() as u64)?;
    let mut image = header.to_bytes()?;
    image.reserve_exact(payload.len());
    image.extend_from_slice(payload);
    Ok(image)
}

/// Read `input`, prepend the header and write the result to `output`.
///
/// The header is validated before `output` is touched, so a header error
/// never creates or truncates the destination. A write error can leave a
/// partial file behind; it must not be used.
pub fn frame<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<FrameReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!("Reading payload from {}", input.display());
    let payload = fs::read(input).map_err(|e| TosImageError::input(input, e))?;

    let header = TosHeader::for_payload_len(payload.len() as u64)?;
    let header_bytes = header.to_bytes()?;

    info!(
        "Writing {} byte image to {}",
        header.total_size(),
        output.display()
    );
    write_image(output, &header_bytes, &payload)?;

    Ok(FrameReport {
        payload_size: payload.len() as u64,
        image_size: header.total_size(),
    })
}

fn write_image(output: &Path, header: &[u8], payload: &[u8]) -> Result<()> {
    let file = File::create(output).map_err(|e| TosImageError::output(output, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(header)
        .and_then(|_| writer.write_all(payload))
        .and_then(|_| writer.flush())
        .map_err(|e| TosImageError::output(output, e))
}

/// Set the image to owner read/write, group and other read.
#[cfg(unix)]
pub fn set_output_permissions<P: AsRef<Path>>(path: P) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    debug!("chmod 644 {}", path.display());
    fs::set_permissions(path, fs::Permissions::from_mode(0o644)).map_err(|source| {
        TosImageError::Permissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Mode bits do not exist here; the image keeps its default permissions.
#[cfg(not(unix))]
pub fn set_output_permissions<P: AsRef<Path>>(path: P) -> Result<()> {
    debug!("skipping permissions for {}", path.as_ref().display());
    Ok(())
}

/// A framed image split back into header and payload
#[derive(Debug, Clone, Copy)]
pub struct TosImage<'a> {
    header: TosHeader,
    payload: &'a [u8],
}

impl<'a> TosImage<'a> {
    /// Validate the header of `data` and borrow the payload behind it
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = TosHeader::from_bytes(data)?;
        let payload = &data[TOS_HEADER_SIZE..];
        if payload.len() as u64 != header.size as u64 {
            return Err(TosImageError::invalid_header(format!(
                "header declares {} payload bytes, image carries {}",
                header.size,
                payload.len()
            )));
        }
        Ok(Self { header, payload })
    }

    pub fn header(&self) -> &TosHeader {
        &self.header
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_bytes_deadbeef() {
        let image = frame_bytes(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(image.len(), 516);
        assert_eq!(&image[..7], b"NVTOSP\0");
        assert_eq!(&image[20..24], &[0x04, 0x00, 0x00, 0x00]);
        assert_eq!(&image[512..], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_frame_bytes_empty() {
        let image = frame_bytes(&[]).unwrap();
        assert_eq!(image.len(), TOS_HEADER_SIZE);
        assert_eq!(&image[20..28], &[0u8; 8]);
        assert_eq!(&image[..9], b"NVTOSP\x000\x00");
    }

    #[test]
    fn test_parse_round_trip() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let image = frame_bytes(&payload).unwrap();
        let parsed = TosImage::parse(&image).unwrap();
        assert_eq!(parsed.header().size, 5000);
        assert_eq!(parsed.payload(), payload.as_slice());
    }

    #[test]
    fn test_parse_rejects_truncated_payload() {
        let image = frame_bytes(b"firmware").unwrap();
        let err = TosImage::parse(&image[..image.len() - 1]).unwrap_err();
        assert!(matches!(err, TosImageError::InvalidHeader(_)));
    }
}
