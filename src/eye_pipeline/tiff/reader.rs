use std::io::{Cursor, Read, Seek};
use std::path::Path;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::raster::Raster;

/// Reads an 8-bit Gray, RGB or RGBA TIFF file. Alpha is dropped.
pub fn read_tiff<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        LocalizationError::DecodeError(format!("{}: {}", path.display(), e))
    })?;
    decode(std::io::BufReader::new(file))
}

/// Decodes an in-memory TIFF.
pub fn decode_tiff(data: &[u8]) -> Result<Raster> {
    debug!("Decoding TIFF image, {} bytes", data.len());
    decode(Cursor::new(data))
}

fn decode<R: Read + Seek>(reader: R) -> Result<Raster> {
    let mut decoder = Decoder::new(reader).map_err(|e| LocalizationError::DecodeError(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| LocalizationError::DecodeError(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| LocalizationError::DecodeError(e.to_string()))?;

    let source_channels = match color_type {
        ColorType::Gray(8) => 1,
        ColorType::RGB(8) => 3,
        ColorType::RGBA(8) => 4,
        other => {
            return Err(LocalizationError::DecodeError(format!(
                "unsupported color type {:?}",
                other
            )));
        }
    };

    let samples = match decoder
        .read_image()
        .map_err(|e| LocalizationError::DecodeError(e.to_string()))?
    {
        DecodingResult::U8(samples) => samples,
        _ => {
            return Err(LocalizationError::DecodeError(
                "expected 8-bit samples".to_string(),
            ));
        }
    };

    let data = if source_channels == 4 {
        samples
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    } else {
        samples
    };

    debug!("Decoded image: {}x{} ({:?})", width, height, color_type);

    Raster::new(
        width as usize,
        height as usize,
        source_channels.min(3),
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eye_pipeline::tiff::{StandardTiffWriter, TiffWriter};

    #[test]
    fn written_color_raster_reads_back() {
        let color = Raster::new(2, 2, 3, (0u8..12).collect()).unwrap();
        let mut bytes = Vec::new();
        StandardTiffWriter.write_tiff(&color, &mut bytes).unwrap();

        assert_eq!(decode_tiff(&bytes).unwrap(), color);
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plane.tiff");
        let plane = Raster::from_fn(3, 2, |x, y| (x * 40 + y) as u8);
        let mut file = std::fs::File::create(&path).unwrap();
        StandardTiffWriter.write_tiff(&plane, &mut file).unwrap();
        drop(file);

        assert_eq!(read_tiff(&path).unwrap(), plane);
    }

    #[test]
    fn garbage_is_decode_error() {
        let result = decode_tiff(b"definitely not a tiff");
        assert!(matches!(result, Err(LocalizationError::DecodeError(_))));
    }

    #[test]
    fn missing_file_is_decode_error() {
        let result = read_tiff("/nonexistent/eye.tiff");
        assert!(matches!(result, Err(LocalizationError::DecodeError(_))));
    }
}
