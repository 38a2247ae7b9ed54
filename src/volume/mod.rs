//! This module defines the voxel volume API, as well as the in-memory
//! volume type from which atlases are packed.
//! An integration with `ndarray` is available with the `ndarray_volumes`
//! feature.

pub mod element;
pub mod inmem;
#[cfg(feature = "ndarray_volumes")]
pub mod ndarray;
pub mod shape;

pub use self::element::{DataElement, Rescale, Texel};
pub use self::inmem::{InMemVolume, VolumeData};
#[cfg(feature = "ndarray_volumes")]
pub use self::ndarray::IntoNdArray;
pub use self::shape::Dim3;

use crate::error::Result;
use crate::typedef::NiftiType;

/// Public API for volume data, exposed as a 3-dimensional voxel array
/// with a fixed number of components per voxel.
pub trait Volume {
    /// Get the spatial shape of the volume.
    fn dim(&self) -> Dim3;

    /// World units per voxel along each axis.
    fn spacing(&self) -> [f64; 3];

    /// Get this volume's data type.
    fn data_type(&self) -> NiftiType;

    /// Number of components per voxel.
    fn element_stride(&self) -> usize {
        self.data_type().components()
    }

    /// Fetch all components of a single voxel, after rescaling.
    ///
    /// # Errors
    ///
    /// - `MosaicError::OutOfBounds` if the given coordinates surpass this
    /// volume's boundaries.
    fn get_texel(&self, idx: [usize; 3]) -> Result<Texel>;

    /// Fetch the first component of a single voxel as a double precision
    /// floating point value.
    fn get_f64(&self, idx: [usize; 3]) -> Result<f64> {
        Ok(self.get_texel(idx)?.as_slice()[0])
    }

    /// World length of the volume along each axis (`dim * spacing`).
    fn extents(&self) -> [f64; 3] {
        let dim = self.dim();
        let spacing = self.spacing();
        [
            dim.nx() as f64 * spacing[0],
            dim.ny() as f64 * spacing[1],
            dim.nz() as f64 * spacing[2],
        ]
    }
}

impl<'a, V: Volume + ?Sized> Volume for &'a V {
    fn dim(&self) -> Dim3 {
        (**self).dim()
    }

    fn spacing(&self) -> [f64; 3] {
        (**self).spacing()
    }

    fn data_type(&self) -> NiftiType {
        (**self).data_type()
    }

    fn element_stride(&self) -> usize {
        (**self).element_stride()
    }

    fn get_texel(&self, idx: [usize; 3]) -> Result<Texel> {
        (**self).get_texel(idx)
    }
}
