//! Min-max feature normalization
//!
//! Rescales each feature column into `[0, 1]` using the column's observed
//! minimum and maximum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NutritionRecord;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("No rows to normalize")]
    Empty,

    #[error("Row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },

    #[error("Scaler has {min} minima but {max} maxima")]
    MismatchedScaler { min: usize, max: usize },
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Per-column scaling learned from a feature matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl MinMaxScaler {
    /// Learn column minima and maxima
    pub fn fit(rows: &[Vec<f64>]) -> NormalizeResult<Self> {
        let width = validate(rows)?;
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];
        for row in rows {
            for (column, value) in row.iter().enumerate() {
                min[column] = min[column].min(*value);
                max[column] = max[column].max(*value);
            }
        }
        Ok(Self { min, max })
    }

    pub fn width(&self) -> usize {
        self.min.len()
    }

    /// Scale one value of a column; `None` when the column is unknown.
    /// A constant column maps to 0.
    fn scale_value(&self, column: usize, value: f64) -> Option<f64> {
        let min = *self.min.get(column)?;
        let range = self.max.get(column)? - min;
        if range == 0.0 {
            Some(0.0)
        } else {
            Some((value - min) / range)
        }
    }

    /// Scale rows with the learned ranges. Values outside the fitted range
    /// fall outside `[0, 1]`.
    pub fn transform(&self, rows: &[Vec<f64>]) -> NormalizeResult<Vec<Vec<f64>>> {
        if self.min.len() != self.max.len() {
            return Err(NormalizeError::MismatchedScaler {
                min: self.min.len(),
                max: self.max.len(),
            });
        }
        let width = validate(rows)?;
        if width != self.width() {
            return Err(NormalizeError::RaggedRow {
                row: 0,
                expected: self.width(),
                found: width,
            });
        }
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                row.iter()
                    .enumerate()
                    .map(|(column, value)| {
                        self.scale_value(column, *value)
                            .ok_or(NormalizeError::RaggedRow {
                                row: row_index,
                                expected: self.width(),
                                found: row.len(),
                            })
                    })
                    .collect()
            })
            .collect()
    }

    pub fn fit_transform(rows: &[Vec<f64>]) -> NormalizeResult<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }
}

/// Check the matrix is non-empty, rectangular and finite; returns its width
fn validate(rows: &[Vec<f64>]) -> NormalizeResult<usize> {
    let first = rows.first().ok_or(NormalizeError::Empty)?;
    let expected = first.len();
    if expected == 0 {
        return Err(NormalizeError::Empty);
    }
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(NormalizeError::RaggedRow {
                row: row_index,
                expected,
                found: row.len(),
            });
        }
        if let Some(column) = row.iter().position(|v| !v.is_finite()) {
            return Err(NormalizeError::NonFinite {
                row: row_index,
                column,
            });
        }
    }
    Ok(expected)
}

/// Normalize `[calories, fat, carbohydrates, protein]` of both record sets.
///
/// Open Food Facts rows come first, then USDA rows, in input order.
pub fn normalize_records(
    off: &[NutritionRecord],
    usda: &[NutritionRecord],
) -> NormalizeResult<Vec<Vec<f64>>> {
    let rows: Vec<Vec<f64>> = off
        .iter()
        .chain(usda.iter())
        .map(|record| record.features().to_vec())
        .collect();
    let (_, scaled) = MinMaxScaler::fit_transform(&rows)?;
    tracing::info!(
        "Normalized {} records ({} OFF, {} USDA)",
        scaled.len(),
        off.len(),
        usda.len()
    );
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataSource;

    fn record(calories: f64, fat: f64, carbohydrates: f64, protein: f64) -> NutritionRecord {
        NutritionRecord {
            product_name: None,
            calories,
            fat,
            carbohydrates,
            protein,
            source: DataSource::Unknown,
            fetched_at: None,
        }
    }

    #[test]
    fn test_columns_scale_into_unit_range() {
        let rows = vec![vec![100.0, 1.0], vec![200.0, 3.0], vec![150.0, 2.0]];
        let (scaler, scaled) = MinMaxScaler::fit_transform(&rows).unwrap();
        assert_eq!(scaler.min, vec![100.0, 1.0]);
        assert_eq!(scaler.max, vec![200.0, 3.0]);
        assert_eq!(scaled, vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let rows = vec![vec![7.0, 1.0], vec![7.0, 2.0]];
        let (_, scaled) = MinMaxScaler::fit_transform(&rows).unwrap();
        assert_eq!(scaled[0][0], 0.0);
        assert_eq!(scaled[1][0], 0.0);
    }

    #[test]
    fn test_rejects_empty_ragged_and_nan() {
        assert_eq!(MinMaxScaler::fit(&[]), Err(NormalizeError::Empty));
        assert_eq!(
            MinMaxScaler::fit(&[vec![1.0, 2.0], vec![1.0]]),
            Err(NormalizeError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            MinMaxScaler::fit(&[vec![1.0, f64::NAN]]),
            Err(NormalizeError::NonFinite { row: 0, column: 1 })
        );
    }

    #[test]
    fn test_transform_outside_fitted_range() {
        let scaler = MinMaxScaler::fit(&[vec![0.0], vec![10.0]]).unwrap();
        let scaled = scaler.transform(&[vec![20.0]]).unwrap();
        assert_eq!(scaled, vec![vec![2.0]]);
    }

    #[test]
    fn test_transform_rejects_mismatched_scaler() {
        let scaler = MinMaxScaler {
            min: vec![0.0, 0.0],
            max: vec![1.0],
        };
        assert_eq!(
            scaler.transform(&[vec![0.5, 0.5]]),
            Err(NormalizeError::MismatchedScaler { min: 2, max: 1 })
        );
        assert_eq!(scaler.scale_value(1, 0.5), None);
        assert_eq!(scaler.scale_value(0, 0.5), Some(0.5));
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let scaler = MinMaxScaler::fit(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[vec![1.0]]),
            Err(NormalizeError::RaggedRow { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_normalize_records_concatenates_sources() {
        let off = vec![record(100.0, 0.0, 10.0, 1.0)];
        let usda = vec![record(300.0, 20.0, 30.0, 3.0), record(200.0, 10.0, 20.0, 2.0)];
        let scaled = normalize_records(&off, &usda).unwrap();
        assert_eq!(scaled.len(), 3);
        assert_eq!(scaled[0], vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(scaled[1], vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(scaled[2], vec![0.5, 0.5, 0.5, 0.5]);
    }
}
