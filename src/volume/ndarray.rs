//! Interfaces and implementations specific to integration with `ndarray`.
//!
//! This module introduces the trait [`IntoNdArray`], which maps a volume
//! into an [`Array`] of `f64` values, with the value rescaling already
//! applied.
//!
//! #### Note on memory order
//!
//! NIfTI volumes are stored in column major order (also called Fortran
//! order), and so is the resulting array. Color volumes gain a trailing
//! axis of length 3.
//!
//! [`IntoNdArray`]: ./trait.IntoNdArray.html
//! [`Array`]: ../../../ndarray/type.Array.html
use super::inmem::InMemVolume;
use super::Volume;
use crate::error::{MosaicError, Result};
use ::ndarray::{Array, IxDyn, ShapeBuilder};

/// Trait for volumes which can be converted to an ndarray.
pub trait IntoNdArray {
    /// Consume the volume into an array of shape `[nx, ny, nz]`, or
    /// `[nx, ny, nz, components]` for multi-component volumes.
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>>;
}

impl IntoNdArray for InMemVolume {
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>> {
        (&self).into_ndarray()
    }
}

impl<'a> IntoNdArray for &'a InMemVolume {
    fn into_ndarray(self) -> Result<Array<f64, IxDyn>> {
        let dim = self.dim();
        let stride = self.element_stride();
        let mut shape: Vec<usize> = dim.as_ref().to_vec();
        if stride > 1 {
            shape.push(stride);
        }

        // column major: components vary slowest
        let mut values = vec![0.; dim.element_count() * stride];
        let plane = dim.element_count();
        for (n, idx) in dim.index_iter().enumerate() {
            let texel = self.get_texel(idx)?;
            for (c, v) in texel.as_slice().iter().enumerate() {
                values[c * plane + n] = *v;
            }
        }
        let expected = values.len();
        Array::from_shape_vec(IxDyn(&shape).f(), values)
            .map_err(|_| MosaicError::IncompatibleLength(dim.element_count(), expected))
    }
}
