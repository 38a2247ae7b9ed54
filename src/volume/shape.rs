//! Shape and 3-dimensional index constructs.
//!
//! The NIfTI-1 `dim` field is an array of 8 integers where the first element
//! is the number of dimensions. The sampling engine only works with spatial
//! volumes, so shapes are validated into [`Dim3`], which holds the extents
//! ordered from the fastest to the slowest varying axis.
//!
//! [`Dim3`]: ./struct.Dim3.html
use crate::error::{MosaicError, Result};

/// A validated 3D volume shape `(nx, ny, nz)`.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct Dim3([usize; 3]);

impl Dim3 {
    /// Validate and create a new volume shape. All extents must be positive.
    ///
    /// # Example
    ///
    /// ```
    /// # use nifti_mosaic::volume::shape::Dim3;
    /// let dim = Dim3::new([64, 32, 16])?;
    /// assert_eq!(dim.element_count(), 64 * 32 * 16);
    /// # Ok::<(), nifti_mosaic::MosaicError>(())
    /// ```
    pub fn new(dim: [usize; 3]) -> Result<Self> {
        for (axis, d) in dim.iter().enumerate() {
            if *d == 0 {
                return Err(MosaicError::InconsistentDim(axis as u8, *d));
            }
        }
        Ok(Dim3(dim))
    }

    /// Validate and create a shape from the raw NIfTI `dim` field.
    /// Volumes of rank 1 and 2 are promoted to 3D with unit extents,
    /// while dimensions beyond the third must be singleton.
    pub fn from_raw(raw: [u16; 8]) -> Result<Self> {
        let rank = usize::from(raw[0]);
        if rank == 0 || rank > 7 {
            return Err(MosaicError::InconsistentDim(0, rank));
        }
        let mut dim = [1usize; 3];
        for axis in 0..rank {
            let d = usize::from(raw[axis + 1]);
            if axis < 3 {
                dim[axis] = d;
            } else if d != 1 {
                return Err(MosaicError::InconsistentDim(axis as u8 + 1, d));
            }
        }
        Dim3::new(dim)
    }

    /// Extent along the X (fastest varying) axis.
    pub fn nx(&self) -> usize {
        self.0[0]
    }

    /// Extent along the Y axis.
    pub fn ny(&self) -> usize {
        self.0[1]
    }

    /// Extent along the Z (slowest varying) axis, i.e. the number of slices.
    pub fn nz(&self) -> usize {
        self.0[2]
    }

    /// Calculate the number of voxels in this shape.
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Whether the given voxel index lies inside this shape.
    pub fn contains(&self, idx: [i64; 3]) -> bool {
        idx.iter()
            .zip(self.0.iter())
            .all(|(i, d)| *i >= 0 && (*i as usize) < *d)
    }

    /// Linear (column major) position of a voxel.
    ///
    /// # Errors
    ///
    /// - `MosaicError::OutOfBounds` if the index surpasses this shape.
    pub fn linear_index(&self, idx: [usize; 3]) -> Result<usize> {
        if idx.iter().zip(self.0.iter()).any(|(i, d)| i >= d) {
            return Err(MosaicError::OutOfBounds(idx));
        }
        Ok(idx[0] + self.0[0] * (idx[1] + self.0[1] * idx[2]))
    }

    /// Provide an iterator traversing through all voxel indices of a
    /// hypothetical volume with this shape, in column major order.
    pub fn index_iter(&self) -> impl Iterator<Item = [usize; 3]> {
        let [nx, ny, nz] = self.0;
        (0..nz).flat_map(move |k| (0..ny).flat_map(move |j| (0..nx).map(move |i| [i, j, k])))
    }
}

impl AsRef<[usize]> for Dim3 {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Dim3> for [usize; 3] {
    fn from(dim: Dim3) -> Self {
        dim.0
    }
}

#[cfg(test)]
mod tests {
    use super::Dim3;

    #[test]
    fn test_dim() {
        let dim = Dim3::from_raw([3, 256, 256, 100, 0, 0, 0, 0]).unwrap();
        assert_eq!(dim.as_ref(), &[256, 256, 100]);
        assert_eq!(dim.element_count(), 6553600);
    }

    #[test]
    fn test_dim_promotion() {
        let dim = Dim3::from_raw([2, 3, 4, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(dim.as_ref(), &[3, 4, 1]);

        let dim = Dim3::from_raw([4, 3, 4, 5, 1, 0, 0, 0]).unwrap();
        assert_eq!(dim.as_ref(), &[3, 4, 5]);

        assert!(Dim3::from_raw([4, 3, 4, 5, 2, 0, 0, 0]).is_err());
        assert!(Dim3::from_raw([3, 3, 0, 5, 0, 0, 0, 0]).is_err());
        assert!(Dim3::from_raw([0, 3, 4, 5, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_linear_index() {
        let dim = Dim3::new([16, 16, 3]).unwrap();
        assert_eq!(dim.linear_index([0, 0, 0]).unwrap(), 0);
        assert_eq!(dim.linear_index([1, 0, 0]).unwrap(), 1);
        assert_eq!(dim.linear_index([0, 1, 0]).unwrap(), 16);
        assert_eq!(dim.linear_index([0, 0, 1]).unwrap(), 256);
        assert_eq!(dim.linear_index([1, 1, 1]).unwrap(), 273);
        assert_eq!(dim.linear_index([15, 15, 2]).unwrap(), 16 * 16 * 3 - 1);
        assert!(dim.linear_index([16, 15, 2]).is_err());
    }

    #[test]
    fn test_index_iter() {
        let dim = Dim3::new([3, 2, 2]).unwrap();
        let idx: Vec<_> = dim.index_iter().collect();
        assert_eq!(idx.len(), dim.element_count());
        for (n, i) in idx.iter().enumerate() {
            assert_eq!(dim.linear_index(*i).unwrap(), n);
        }
        assert_eq!(idx[4], [1, 1, 0]);
    }

    #[test]
    fn test_contains() {
        let dim = Dim3::new([4, 4, 2]).unwrap();
        assert!(dim.contains([0, 3, 1]));
        assert!(!dim.contains([-1, 0, 0]));
        assert!(!dim.contains([0, 0, 2]));
    }
}
