//! Output writers: plain-text PGM images and prediction CSVs

use crate::error::{NetworkError, Result};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `pixels` as a plain (P2) grayscale PGM image with max value 255.
///
/// Intensities are rounded and clamped to `[0, 255]`; each image row goes on
/// its own line. Requires `pixels.len() == width * height`.
pub fn write_pgm(path: impl AsRef<Path>, pixels: &[f32], width: usize, height: usize) -> Result<()> {
    if pixels.len() != width * height {
        return Err(NetworkError::ShapeMismatch(format!(
            "{} pixels do not match image dimensions {}x{}",
            pixels.len(),
            width,
            height
        )));
    }

    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NetworkError::file(path.display().to_string(), e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P2")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;
    if width > 0 {
        for row in pixels.chunks(width) {
            let line = row
                .iter()
                .map(|&p| (p.round().clamp(0.0, 255.0) as u8).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{}", line)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes predicted classes as `ImageId,Label` rows with 1-based image ids.
pub fn write_predictions(path: impl AsRef<Path>, predictions: &[usize]) -> Result<()> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let to_file_error = |e: csv::Error| NetworkError::file(display.clone(), e);

    let mut writer = csv::Writer::from_path(path).map_err(to_file_error)?;
    writer.write_record(["ImageId", "Label"]).map_err(to_file_error)?;
    for (index, label) in predictions.iter().enumerate() {
        writer
            .write_record([(index + 1).to_string(), label.to_string()])
            .map_err(to_file_error)?;
    }
    writer.flush()?;

    info!("Results written to {}", display);
    Ok(())
}
