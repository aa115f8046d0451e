//! Row-major matrix of `f32` vectors used for batch insert and fetch.

use crate::error::VectorError;

/// A dense 2-D matrix with one vector per row.
///
/// The column count is the vector dimensionality (the "last axis").
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatrix {
    dimensions: usize,
    data: Vec<f32>,
}

impl VectorMatrix {
    /// Empty matrix with a fixed row width.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
        }
    }

    /// Empty matrix with room for `rows` rows.
    pub fn with_capacity(dimensions: usize, rows: usize) -> Self {
        Self {
            dimensions,
            data: Vec::with_capacity(dimensions * rows),
        }
    }

    /// Build from flat row-major storage.
    pub fn from_flat(dimensions: usize, data: Vec<f32>) -> Result<Self, VectorError> {
        if dimensions == 0 {
            if data.is_empty() {
                return Ok(Self::new(0));
            }
            return Err(VectorError::DimensionMismatch {
                expected: 0,
                actual: data.len(),
            });
        }
        if data.len() % dimensions != 0 {
            return Err(VectorError::DimensionMismatch {
                expected: dimensions,
                actual: data.len() % dimensions,
            });
        }
        Ok(Self { dimensions, data })
    }

    /// Stack rows into a matrix. Every row must have the same length.
    ///
    /// An empty input gives a 0x0 matrix.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, VectorError> {
        let dimensions = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut matrix = Self::with_capacity(dimensions, rows.len());
        for row in rows {
            matrix.push_row(row.as_ref())?;
        }
        Ok(matrix)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), VectorError> {
        if row.len() != self.dimensions {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimensions,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Append a row filled with quiet NaN.
    pub fn push_nan_row(&mut self) {
        let len = self.data.len() + self.dimensions;
        self.data.resize(len, f32::NAN);
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn rows(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    /// (rows, dimensions)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.dimensions)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows() {
            return None;
        }
        let start = index * self.dimensions;
        Some(&self.data[start..start + self.dimensions])
    }

    /// True when every element of the row is NaN (a missing entry).
    pub fn is_missing_row(&self, index: usize) -> bool {
        self.row(index)
            .map(|r| !r.is_empty() && r.iter().all(|x| x.is_nan()))
            .unwrap_or(false)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on 0
        self.data.chunks_exact(self.dimensions.max(1))
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    pub fn into_rows(self) -> Vec<Vec<f32>> {
        self.iter_rows().map(<[f32]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_preserves_order() {
        let matrix = VectorMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.row(0), Some(&[1.0, 2.0][..]));
        assert_eq!(matrix.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(matrix.row(2), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = VectorMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_flat() {
        let matrix = VectorMatrix::from_flat(3, (0..6).map(|x| x as f32).collect()).unwrap();
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.row(1), Some(&[3.0, 4.0, 5.0][..]));

        assert!(VectorMatrix::from_flat(4, vec![0.0; 6]).is_err());
    }

    #[test]
    fn test_nan_row() {
        let mut matrix = VectorMatrix::new(3);
        matrix.push_row(&[1.0, 2.0, 3.0]).unwrap();
        matrix.push_nan_row();
        assert_eq!(matrix.rows(), 2);
        assert!(!matrix.is_missing_row(0));
        assert!(matrix.is_missing_row(1));
        assert!(matrix.row(1).unwrap().iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_empty() {
        let matrix = VectorMatrix::from_rows::<Vec<f32>>(&[]).unwrap();
        assert!(matrix.is_empty());
        assert_eq!(matrix.shape(), (0, 0));
        assert_eq!(matrix.iter_rows().count(), 0);
    }

    #[test]
    fn test_into_rows() {
        let rows = vec![vec![0.5, 1.5], vec![2.5, 3.5]];
        let matrix = VectorMatrix::from_rows(&rows).unwrap();
        assert_eq!(matrix.into_rows(), rows);
    }
}
