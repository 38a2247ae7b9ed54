//! Types for error handling go here.
use crate::typedef::NiftiType;
use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum MosaicError {
        /// The voxel-to-world affine cannot be inverted.
        SingularTransform(det: f64) {
            display("Singular voxel-to-world transform (determinant {})", det)
        }
        /// A slice index outside `[0, total)` was given to the atlas layout.
        SliceIndexOutOfRange(index: i64, total: usize) {
            display("Slice index {} is out of range (total slices: {})", index, total)
        }
        /// An address resolved to an atlas which is not part of the atlas set.
        UnknownAtlasIndex(index: usize, available: usize) {
            display("Atlas index {} is unknown ({} atlases available)", index, available)
        }
        /// The element type of the volume cannot be sampled.
        UnsupportedElementType(t: NiftiType) {
            display("Unsupported element type {:?}", t)
        }
        /// A header field holds a code which does not map to a known value.
        InvalidCode(typename: &'static str, code: i16) {
            display("invalid code `{}` for header field {}", code, typename)
        }
        /// The quaternion parameters do not describe a rotation.
        InvalidQuaternion(w2: f64) {
            display("Invalid quaternion: 1 - (b² + c² + d²) = {} is negative", w2)
        }
        /// The atlas grid parameters are inconsistent.
        InvalidLayout(reason: &'static str) {
            display("Invalid atlas layout: {}", reason)
        }
        /// A data buffer does not have the length implied by its shape.
        IncompatibleLength(got: usize, expected: usize) {
            display("Data length {} does not match the expected length {}", got, expected)
        }
        /// A volume extent is not valid.
        InconsistentDim(axis: u8, value: usize) {
            display("Inconsistent value `{}` in volume extent #{}", value, axis)
        }
        /// Attempted to read a voxel outside the volume's boundaries.
        OutOfBounds(coords: [usize; 3]) {
            display("Out of bounds access to volume: {:?}", &coords[..])
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, MosaicError>;
