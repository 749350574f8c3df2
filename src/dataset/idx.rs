use std::path::Path;

use log::info;

use crate::dataset::sample::{Sample, CLASSES, IMAGE_PIXELS, IMAGE_SIDE};
use crate::error::{NnError, Result};

/// Parse a pair of MNIST IDX files (images + labels) into samples.
///
/// # IDX3 image file layout
/// ```text
/// bytes  0-1:   0x00 0x00   (reserved, must be zero)
/// byte   2:     0x08        (dtype = uint8)
/// byte   3:     0x03        (number of dimensions = 3)
/// bytes  4-7:   N           (number of images, big-endian u32)
/// bytes  8-11:  rows        (must be 28)
/// bytes 12-15:  cols        (must be 28)
/// bytes 16..:   N * 784 bytes, row-major, uint8
/// ```
///
/// # IDX1 label file layout
/// ```text
/// bytes  0-1:   0x00 0x00
/// byte   2:     0x08
/// byte   3:     0x01
/// bytes  4-7:   N           (must equal the image count)
/// bytes  8..:   N bytes, each a digit in [0, 10)
/// ```
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Vec<Sample>> {
    // ── Image file validation ───────────────────────────────────────────────

    check_header("image", image_bytes, 16, 0x03)?;

    let n_items = read_u32(image_bytes, 4);
    let rows = read_u32(image_bytes, 8);
    let cols = read_u32(image_bytes, 12);

    if rows != IMAGE_SIDE || cols != IMAGE_SIDE {
        return Err(NnError::Dataset(format!(
            "IDX image file: expected {IMAGE_SIDE}x{IMAGE_SIDE} images, got {rows}x{cols}."
        )));
    }

    let required_image_len = n_items
        .checked_mul(IMAGE_PIXELS)
        .and_then(|n| n.checked_add(16))
        .ok_or_else(|| NnError::Dataset(format!("IDX image file: {n_items} items overflows usize.")))?;

    if image_bytes.len() < required_image_len {
        return Err(NnError::Dataset(format!(
            "IDX image file too short: header declares {} images ({} bytes needed), \
             but file is only {} bytes.",
            n_items,
            required_image_len,
            image_bytes.len()
        )));
    }

    // ── Label file validation ───────────────────────────────────────────────

    check_header("label", label_bytes, 8, 0x01)?;

    let label_count = read_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(NnError::Dataset(format!(
            "IDX file mismatch: image file declares {n_items} items but label file declares {label_count}."
        )));
    }

    if label_bytes.len() < 8 + n_items {
        return Err(NnError::Dataset(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes.",
            n_items,
            label_bytes.len()
        )));
    }

    // ── Build samples ───────────────────────────────────────────────────────

    let images = image_bytes[16..required_image_len].chunks_exact(IMAGE_PIXELS);
    let labels = &label_bytes[8..8 + n_items];

    let mut samples = Vec::with_capacity(n_items);
    for (i, (chunk, &label)) in images.zip(labels).enumerate() {
        if label as usize >= CLASSES {
            return Err(NnError::Dataset(format!(
                "IDX label at index {i}: digit {label} is out of range."
            )));
        }
        let mut pixels = [0u8; IMAGE_PIXELS];
        pixels.copy_from_slice(chunk);
        samples.push(Sample { label, pixels });
    }

    Ok(samples)
}

/// Reads both files from disk and parses them with [`parse_idx_pair`].
pub fn load_idx_pair(image_path: impl AsRef<Path>, label_path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let image_bytes = std::fs::read(image_path.as_ref())?;
    let label_bytes = std::fs::read(label_path.as_ref())?;
    let samples = parse_idx_pair(&image_bytes, &label_bytes)?;
    info!(
        "loaded {} samples from {}",
        samples.len(),
        image_path.as_ref().display()
    );
    Ok(samples)
}

fn check_header(kind: &str, bytes: &[u8], header_len: usize, dims: u8) -> Result<()> {
    if bytes.len() < header_len {
        return Err(NnError::Dataset(format!(
            "IDX {kind} file too short: expected at least {header_len} header bytes, got {}.",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(NnError::Dataset(format!(
            "IDX {kind} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(NnError::Dataset(format!(
            "IDX {kind} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(NnError::Dataset(format!(
            "IDX {kind} file: byte 3 (dimensions) must be {dims}, got {}.",
            bytes[3]
        )));
    }
    Ok(())
}

fn read_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an in-memory IDX pair; image `i` is filled with byte `i`.
    fn idx_pair(labels: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let n = labels.len() as u32;
        let mut images = vec![0x00u8, 0x00, 0x08, 0x03];
        images.extend(n.to_be_bytes());
        images.extend(28u32.to_be_bytes());
        images.extend(28u32.to_be_bytes());
        for i in 0..labels.len() {
            images.extend(std::iter::repeat(i as u8).take(IMAGE_PIXELS));
        }

        let mut label_file = vec![0x00u8, 0x00, 0x08, 0x01];
        label_file.extend(n.to_be_bytes());
        label_file.extend_from_slice(labels);
        (images, label_file)
    }

    #[test]
    fn parses_valid_pair() {
        let (images, labels) = idx_pair(&[5, 0, 9]);
        let samples = parse_idx_pair(&images, &labels).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label, 5);
        assert_eq!(samples[2].label, 9);
        assert!(samples[1].pixels.iter().all(|&p| p == 1));
    }

    #[test]
    fn rejects_bad_magic() {
        let (mut images, labels) = idx_pair(&[1]);
        images[3] = 0x02;
        assert!(matches!(parse_idx_pair(&images, &labels), Err(NnError::Dataset(_))));
    }

    #[test]
    fn rejects_count_mismatch() {
        let (images, _) = idx_pair(&[1, 2]);
        let (_, labels) = idx_pair(&[1]);
        assert!(parse_idx_pair(&images, &labels).is_err());
    }

    #[test]
    fn rejects_truncated_images() {
        let (mut images, labels) = idx_pair(&[1, 2]);
        images.truncate(images.len() - 1);
        assert!(parse_idx_pair(&images, &labels).is_err());
    }

    #[test]
    fn rejects_out_of_range_label() {
        let (images, labels) = idx_pair(&[3, 10]);
        assert!(parse_idx_pair(&images, &labels).is_err());
    }

    #[test]
    fn rejects_short_header() {
        assert!(parse_idx_pair(&[0, 0, 8], &[0, 0, 8, 1]).is_err());
    }
}
