//! CSV image loading and one-hot label encoding
//!
//! The expected layout is MNIST-style: a header line, then one image per row,
//! optionally led by an integer class label, followed by the pixel intensities.

use crate::error::{NetworkError, Result};
use crate::network::Sample;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;
use std::path::Path;

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Class label, absent for unlabeled (test) data
    pub label: Option<usize>,
    pub pixels: Vec<f32>,
}

impl ImageRecord {
    /// Pairs the pixels with the one-hot encoding of the label.
    ///
    /// Fails with `InvalidArgument` for an unlabeled record or a label outside
    /// `[0, num_classes)`.
    pub fn into_sample(self, num_classes: usize) -> Result<Sample> {
        let label = self.label.ok_or_else(|| {
            NetworkError::InvalidArgument("record has no label".to_string())
        })?;
        Ok(Sample::new(self.pixels, one_hot(label, num_classes)?))
    }
}

/// Vector of length `num_classes` with a single 1 at `label`.
pub fn one_hot(label: usize, num_classes: usize) -> Result<Vec<f32>> {
    if label >= num_classes {
        return Err(NetworkError::InvalidArgument(format!(
            "label {} outside [0, {})",
            label, num_classes
        )));
    }
    let mut encoded = vec![0.0; num_classes];
    encoded[label] = 1.0;
    Ok(encoded)
}

/// Loads every data row of a CSV file, skipping the header.
///
/// With `labeled` set, the first column of each row is the class label and
/// must lie in `[0, num_classes)`. The whole load fails on the first bad row;
/// no partial dataset is returned.
///
/// # Errors
///
/// - `FileError` if the file cannot be opened or holds no data rows
/// - `ParseError` for a non-numeric pixel, a bad label or a malformed row
pub fn load_csv(path: impl AsRef<Path>, labeled: bool, num_classes: usize) -> Result<Vec<ImageRecord>> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| NetworkError::file(display.clone(), e))?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = index + 2;
        let row = row.map_err(|e| {
            let line = e
                .position()
                .map_or(fallback_line, |position| position.line() as usize);
            NetworkError::parse(line, e.to_string())
        })?;
        let line = row
            .position()
            .map_or(fallback_line, |position| position.line() as usize);
        records.push(parse_row(&row, line, labeled, num_classes)?);
    }

    if records.is_empty() {
        return Err(NetworkError::file(display, "no data rows"));
    }

    info!("Loaded {} rows from {}", records.len(), display);
    Ok(records)
}

fn parse_row(row: &StringRecord, line: usize, labeled: bool, num_classes: usize) -> Result<ImageRecord> {
    let mut fields = row.iter();

    let label = if labeled {
        let token = fields
            .next()
            .ok_or_else(|| NetworkError::parse(line, "missing label"))?;
        let value: i64 = token
            .parse()
            .map_err(|_| NetworkError::parse(line, format!("label '{}' is not an integer", token)))?;
        if value < 0 || value as usize >= num_classes {
            return Err(NetworkError::parse(
                line,
                format!("label {} outside [0, {})", value, num_classes),
            ));
        }
        Some(value as usize)
    } else {
        None
    };

    let pixels = fields
        .map(|token| match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(NetworkError::parse(
                line,
                format!("pixel '{}' is not numeric", token),
            )),
        })
        .collect::<Result<Vec<f32>>>()?;

    if pixels.is_empty() {
        return Err(NetworkError::parse(line, "row has no pixel values"));
    }

    Ok(ImageRecord { label, pixels })
}

/// Divides every pixel by `scale` (255 maps 8-bit intensities to [0, 1]).
pub fn normalize(records: &mut [ImageRecord], scale: f32) {
    for record in records.iter_mut() {
        record.pixels.iter_mut().for_each(|p| *p /= scale);
    }
}

/// Converts labeled records into training samples.
pub fn to_samples(records: Vec<ImageRecord>, num_classes: usize) -> Result<Vec<Sample>> {
    records
        .into_iter()
        .map(|record| record.into_sample(num_classes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(2, 4).unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
        assert!(one_hot(4, 4).is_err());
    }

    #[test]
    fn test_parse_row_labeled() {
        let row = StringRecord::from(vec!["3", "0", "128", "255"]);
        let record = parse_row(&row, 2, true, 10).unwrap();
        assert_eq!(record.label, Some(3));
        assert_eq!(record.pixels, vec![0.0, 128.0, 255.0]);
    }

    #[test]
    fn test_parse_row_rejects_negative_label() {
        let row = StringRecord::from(vec!["-1", "0"]);
        assert!(matches!(
            parse_row(&row, 5, true, 10),
            Err(NetworkError::ParseError { line: 5, .. })
        ));
    }

    #[test]
    fn test_parse_row_rejects_nan_pixel() {
        let row = StringRecord::from(vec!["1.0", "NaN"]);
        assert!(parse_row(&row, 2, false, 10).is_err());
    }

    #[test]
    fn test_normalize() {
        let mut records = vec![ImageRecord {
            label: None,
            pixels: vec![0.0, 255.0],
        }];
        normalize(&mut records, 255.0);
        assert_eq!(records[0].pixels, vec![0.0, 1.0]);
    }

    #[test]
    fn test_unlabeled_record_is_not_a_sample() {
        let record = ImageRecord {
            label: None,
            pixels: vec![1.0],
        };
        assert!(record.into_sample(10).is_err());
    }
}
