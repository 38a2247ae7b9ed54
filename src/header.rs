//! This module defines the `NiftiHeader` struct, the decoded header record
//! from which volume geometry and the voxel-to-world transform are derived.
//!
//! Decoding the header from bytes is the job of a format reader; this crate
//! only consumes the decoded fields.

use crate::error::{MosaicError, Result};
use crate::typedef::{NiftiType, Unit, XForm};
use crate::volume::element::Rescale;
use crate::volume::shape::Dim3;
use num_traits::FromPrimitive;

/// The subset of the NIFTI-1 header consumed by the sampling engine.
/// All fields are public and named after their `nifti1.h` counterparts.
///
/// # Example
///
/// ```
/// use nifti_mosaic::NiftiHeader;
///
/// let hdr = NiftiHeader {
///     dim: [3, 64, 64, 10, 1, 1, 1, 1],
///     pixdim: [1., 3., 3., 3., 0., 0., 0., 0.],
///     ..NiftiHeader::default()
/// };
/// assert_eq!(hdr.spacing(), [3., 3., 3.]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Data array dimensions
    pub dim: [u16; 8],
    /// Defines the data type!
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// Grid spacings, `pixdim[0]` holds the qfac sign
    pub pixdim: [f32; 8],
    /// Data scaling: slope
    pub scl_slope: f32,
    /// Data scaling: offset
    pub scl_inter: f32,
    /// Units of pixdim[1..4]
    pub xyzt_units: u8,
    /// NIFTI_XFORM_* code
    pub qform_code: i16,
    /// NIFTI_XFORM_* code
    pub sform_code: i16,
    /// Quaternion b param
    pub quatern_b: f32,
    /// Quaternion c param
    pub quatern_c: f32,
    /// Quaternion d param
    pub quatern_d: f32,
    /// Quaternion x shift
    pub quatern_x: f32,
    /// Quaternion y shift
    pub quatern_y: f32,
    /// Quaternion z shift
    pub quatern_z: f32,
    /// 1st row affine transform
    pub srow_x: [f32; 4],
    /// 2nd row affine transform
    pub srow_y: [f32; 4],
    /// 3rd row affine transform
    pub srow_z: [f32; 4],
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            dim: [1, 0, 0, 0, 0, 0, 0, 0],
            datatype: 0,
            bitpix: 0,
            pixdim: [0.; 8],
            scl_slope: 0.,
            scl_inter: 0.,
            xyzt_units: 0,
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,
            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],
        }
    }
}

/// The way a voxel-to-world transform is derived from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformMethod {
    /// No orientation information: spacing only.
    ScaleOnly,
    /// Rotation from the quaternion parameters, spacing (with the qfac
    /// sign on the third axis) and offset.
    Quaternion,
    /// The `srow_*` affine rows, taken verbatim.
    RawAffine,
}

impl NiftiHeader {
    /// Get the data type as a validated enum.
    pub fn data_type(&self) -> Result<NiftiType> {
        FromPrimitive::from_i16(self.datatype)
            .ok_or(MosaicError::InvalidCode("datatype", self.datatype))
    }

    /// Get the spatial units type as a validated unit enum.
    pub fn xyzt_to_space(&self) -> Result<Unit> {
        let space_code = self.xyzt_units & 0o0007;
        FromPrimitive::from_u8(space_code)
            .ok_or(MosaicError::InvalidCode("xyzt units (space)", space_code as i16))
    }

    /// Get the time units type as a validated unit enum.
    pub fn xyzt_to_time(&self) -> Result<Unit> {
        let time_code = self.xyzt_units & 0o0070;
        FromPrimitive::from_u8(time_code)
            .ok_or(MosaicError::InvalidCode("xyzt units (time)", time_code as i16))
    }

    /// Get the qform coordinate mapping method as a validated enum.
    pub fn qform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.qform_code)
            .ok_or(MosaicError::InvalidCode("qform", self.qform_code))
    }

    /// Get the sform coordinate mapping method as a validated enum.
    pub fn sform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.sform_code)
            .ok_or(MosaicError::InvalidCode("sform", self.sform_code))
    }

    /// Get the spatial shape of the volume.
    pub fn dim3(&self) -> Result<Dim3> {
        Dim3::from_raw(self.dim)
    }

    /// Per-axis voxel size in world units.
    pub fn spacing(&self) -> [f64; 3] {
        [
            f64::from(self.pixdim[1]).abs(),
            f64::from(self.pixdim[2]).abs(),
            f64::from(self.pixdim[3]).abs(),
        ]
    }

    /// The handedness factor stored in `pixdim[0]`: `-1` if negative,
    /// `1` otherwise (zero included).
    pub fn qfac(&self) -> f64 {
        if self.pixdim[0] < 0. {
            -1.
        } else {
            1.
        }
    }

    /// The value rescaling declared by this header.
    pub fn rescale(&self) -> Rescale {
        Rescale::new(f64::from(self.scl_slope), f64::from(self.scl_inter))
    }

    /// Decide how the voxel-to-world transform should be derived. A known
    /// qform comes first; the sform affine is only used when the qform code
    /// is unknown, and plain spacing when neither is set.
    pub fn transform_method(&self) -> Result<TransformMethod> {
        let sform = self.sform()?;
        if self.qform()?.is_known() {
            Ok(TransformMethod::Quaternion)
        } else if sform.is_known() {
            Ok(TransformMethod::RawAffine)
        } else {
            Ok(TransformMethod::ScaleOnly)
        }
    }
}
