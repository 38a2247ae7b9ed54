//! Sampling engine for NIfTI volumes packed into multi-atlas slice mosaics.
//!
//! A volume of `nx × ny × nz` voxels is stored as a set of 2D atlas images,
//! each a grid of slice tiles. This crate resolves arbitrary 3D query points
//! against such a set: points are mapped into the volume box, slices are
//! addressed to their atlas and tile, and values are read back either at the
//! nearest voxel or trilinearly interpolated across slices (and atlases).
//!
//! # Example
//!
//! ```
//! use nifti_mosaic::{
//!     AffineTransform, AtlasSet, Dim3, InMemVolume, Interpolation, SampleResult,
//!     SamplerConfig, VolumeData, VolumeGeometry, VolumeSampler,
//! };
//! use nalgebra::Point3;
//!
//! # fn run() -> nifti_mosaic::Result<()> {
//! let dim = Dim3::new([4, 4, 20])?;
//! let volume = InMemVolume::new(dim, [1.; 3], VolumeData::Uint8(vec![7; 320]))?;
//! let atlases = AtlasSet::pack(&volume, 4, 4)?;
//! assert_eq!(atlases.len(), 2);
//!
//! let geometry = VolumeGeometry::new(dim, AffineTransform::scale_only([1.; 3])?);
//! let sampler = VolumeSampler::new(geometry, atlases, SamplerConfig::default())?;
//! let result = sampler.sample_at(&Point3::new(0., 0., 6.), Interpolation::Trilinear)?;
//! assert_eq!(result.value().map(|t| t.as_slice()[0]), Some(7.));
//! assert_eq!(
//!     sampler.sample_at(&Point3::new(0., 0., 11.), Interpolation::Nearest)?,
//!     SampleResult::Outside
//! );
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! Volumes are built from decoded header records ([`NiftiHeader`]) and
//! their element arrays, either typed ([`VolumeData`]) or as raw bytes.
//! Parsing of NIfTI files is not part of this crate.
//!
//! [`NiftiHeader`]: ./header/struct.NiftiHeader.html
//! [`VolumeData`]: ./volume/inmem/enum.VolumeData.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

pub mod affine;
pub mod atlas;
pub mod driver;
pub mod error;
pub mod header;
pub mod sampler;
pub mod typedef;
mod util;
pub mod volume;

pub use crate::affine::{AffineTransform, Direction};
pub use crate::atlas::{AtlasAddress, AtlasImage, AtlasLayout, AtlasSet, PixelRegion};
pub use crate::driver::{SamplePlane, SamplingDriver};
pub use crate::error::{MosaicError, Result};
pub use crate::header::{NiftiHeader, TransformMethod};
pub use crate::sampler::{
    Interpolation, SampleFrame, SampleQuery, SampleResult, SamplerConfig, VolumeGeometry,
    VolumeSampler,
};
pub use crate::typedef::{NiftiType, Unit, XForm};
pub use crate::util::{Endianness, ADDRESSING_EPSILON};
pub use crate::volume::{Dim3, InMemVolume, Rescale, Texel, Volume, VolumeData};
