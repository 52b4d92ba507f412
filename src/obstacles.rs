use crate::error::{Result, SolverError};

/// Side length of the square brush used when painting obstacles.
pub const BRUSH_SIZE: usize = 2;

/// N×N solid/fluid flags, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMap {
    n: usize,
    solid: Vec<bool>,
}

impl ObstacleMap {
    /// All-fluid map.
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            solid: vec![false; n * n],
        }
    }

    /// Build a map from rows of 0/1 flags, rejecting anything that is not exactly n×n.
    pub fn from_rows(n: usize, rows: &[Vec<u8>]) -> Result<Self> {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(SolverError::ShapeMismatch {
                expected: n,
                rows: rows.len(),
                cols,
            });
        }

        let mut solid = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &flag) in row.iter().enumerate() {
                match flag {
                    0 => solid.push(false),
                    1 => solid.push(true),
                    other => {
                        return Err(SolverError::InvalidParameter(format!(
                            "obstacle entry at row {i}, column {j} must be 0 or 1, got {other}"
                        )))
                    }
                }
            }
        }
        Ok(Self { n, solid })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_solid(&self, row: usize, col: usize) -> bool {
        self.solid[row * self.n + col]
    }

    /// Flags in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.solid
    }

    pub fn set(&mut self, row: usize, col: usize, solid: bool) {
        if row < self.n && col < self.n {
            self.solid[row * self.n + col] = solid;
        }
    }

    /// Mark a 2×2 block whose top-left corner is (row, col), clipped at the grid edge.
    pub fn paint(&mut self, row: usize, col: usize) {
        for dy in 0..BRUSH_SIZE {
            for dx in 0..BRUSH_SIZE {
                self.set(row + dy, col + dx, true);
            }
        }
    }

    pub fn clear(&mut self) {
        self.solid.fill(false);
    }

    pub fn solid_count(&self) -> usize {
        self.solid.iter().filter(|&&s| s).count()
    }

    /// Rows of 0/1 flags, the wire representation.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.solid
            .chunks(self.n.max(1))
            .map(|row| row.iter().map(|&s| s as u8).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_accepts_square() {
        let rows = vec![vec![0, 1, 0], vec![0, 0, 0], vec![1, 0, 0]];
        let map = ObstacleMap::from_rows(3, &rows).unwrap();
        assert!(map.is_solid(0, 1));
        assert!(map.is_solid(2, 0));
        assert!(!map.is_solid(1, 1));
        assert_eq!(map.solid_count(), 2);
        assert_eq!(map.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_rejects_wrong_row_count() {
        let rows = vec![vec![0, 0, 0], vec![0, 0, 0]];
        let err = ObstacleMap::from_rows(3, &rows).unwrap_err();
        assert_eq!(
            err,
            SolverError::ShapeMismatch {
                expected: 3,
                rows: 2,
                cols: 3
            }
        );
        assert_eq!(err.to_string(), "obstacles must be 3x3, got 2x3");
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![0, 0], vec![0, 0, 0]];
        assert!(matches!(
            ObstacleMap::from_rows(2, &rows),
            Err(SolverError::ShapeMismatch { expected: 2, .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_non_binary_flags() {
        let rows = vec![vec![0, 2], vec![0, 0]];
        assert!(matches!(
            ObstacleMap::from_rows(2, &rows),
            Err(SolverError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_paint_clips_at_edge() {
        let mut map = ObstacleMap::empty(4);
        map.paint(1, 1);
        assert_eq!(map.solid_count(), 4);
        map.paint(3, 3);
        assert_eq!(map.solid_count(), 5);
        assert!(map.is_solid(3, 3));
        map.clear();
        assert_eq!(map.solid_count(), 0);
    }
}
