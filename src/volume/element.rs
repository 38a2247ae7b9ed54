//! This module defines the data element API, which enables volume
//! implementations to read and convert data elements, as well as the value
//! types handed out by the sampling engine.
use crate::error::{MosaicError, Result};
use crate::typedef::NiftiType;
use crate::util::Endianness;
use byteordered::ByteOrdered;
use num_traits::AsPrimitive;
use std::io::Read;

/// The largest number of components a single sample may hold.
pub const MAX_COMPONENTS: usize = 4;

/// Linear value rescaling, as declared by the `scl_slope` and `scl_inter`
/// header fields.
///
/// A slope of zero means that no scaling was specified, and leaves values
/// untouched, as does the identity pair `(1, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    /// Multiplicative factor.
    pub slope: f64,
    /// Additive term, applied after the slope.
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Rescale::identity()
    }
}

impl Rescale {
    /// Create a new rescale with the given slope and intercept.
    pub fn new(slope: f64, intercept: f64) -> Self {
        Rescale { slope, intercept }
    }

    /// The rescale which changes nothing.
    pub fn identity() -> Self {
        Rescale::new(1., 0.)
    }

    /// Whether applying this rescale would leave all values untouched.
    pub fn is_identity(&self) -> bool {
        self.slope == 0. || (self.slope == 1. && self.intercept == 0.)
    }

    /// Linearly transform a value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        if self.is_identity() {
            value
        } else {
            value * self.slope + self.intercept
        }
    }
}

/// A sampled value: a short tuple of numeric components, one per channel
/// of the source volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texel {
    channels: [f64; MAX_COMPONENTS],
    len: usize,
}

impl Texel {
    /// A texel of `len` components, all zero.
    pub fn zero(len: usize) -> Self {
        debug_assert!(len <= MAX_COMPONENTS);
        Texel {
            channels: [0.; MAX_COMPONENTS],
            len: len.min(MAX_COMPONENTS),
        }
    }

    /// A single component texel.
    pub fn scalar(value: f64) -> Self {
        Texel::from_slice(&[value])
    }

    /// Build a texel from its components. Components beyond
    /// `MAX_COMPONENTS` are dropped.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut texel = Texel::zero(values.len().min(MAX_COMPONENTS));
        texel.channels[..texel.len].copy_from_slice(&values[..texel.len]);
        texel
    }

    /// The number of components.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the texel has no components.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The components of this texel.
    pub fn as_slice(&self) -> &[f64] {
        &self.channels[..self.len]
    }

    /// Accumulate `other * weight` into this texel.
    #[inline]
    pub(crate) fn add_weighted(&mut self, other: &Texel, weight: f64) {
        for (c, o) in self.channels[..self.len].iter_mut().zip(other.as_slice()) {
            *c += o * weight;
        }
    }
}

impl AsRef<[f64]> for Texel {
    fn as_ref(&self) -> &[f64] {
        self.as_slice()
    }
}

/// Trait type for characterizing a NIfTI data element, implemented for
/// primitive numeric types which are used by the crate to represent voxel
/// values.
pub trait DataElement: 'static + Sized + Copy + AsPrimitive<f64> {
    /// The `datatype` mapped to the type T
    const DATA_TYPE: NiftiType;

    /// Read a single element from the given byte source.
    fn from_raw<R>(src: R, endianness: Endianness) -> Result<Self>
    where
        R: Read;

    /// Transform the given data vector into a vector of data elements.
    fn from_raw_vec(vec: Vec<u8>, endianness: Endianness) -> Result<Vec<Self>> {
        let size = Self::DATA_TYPE.size_of();
        if vec.len() % size != 0 {
            return Err(MosaicError::IncompatibleLength(
                vec.len(),
                vec.len() / size * size,
            ));
        }
        let mut cursor: &[u8] = &vec;
        (0..vec.len() / size)
            .map(|_| Self::from_raw(&mut cursor, endianness))
            .collect()
    }
}

impl DataElement for u8 {
    const DATA_TYPE: NiftiType = NiftiType::Uint8;
    fn from_raw_vec(vec: Vec<u8>, _: Endianness) -> Result<Vec<Self>> {
        Ok(vec)
    }
    fn from_raw<R>(src: R, _: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::native(src).read_u8().map_err(From::from)
    }
}
impl DataElement for i8 {
    const DATA_TYPE: NiftiType = NiftiType::Int8;
    fn from_raw_vec(vec: Vec<u8>, _: Endianness) -> Result<Vec<Self>> {
        Ok(vec.into_iter().map(|b| b as i8).collect())
    }
    fn from_raw<R>(src: R, _: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::native(src).read_i8().map_err(From::from)
    }
}
impl DataElement for u16 {
    const DATA_TYPE: NiftiType = NiftiType::Uint16;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_u16().map_err(From::from)
    }
}
impl DataElement for i16 {
    const DATA_TYPE: NiftiType = NiftiType::Int16;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_i16().map_err(From::from)
    }
}
impl DataElement for u32 {
    const DATA_TYPE: NiftiType = NiftiType::Uint32;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_u32().map_err(From::from)
    }
}
impl DataElement for i32 {
    const DATA_TYPE: NiftiType = NiftiType::Int32;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_i32().map_err(From::from)
    }
}
impl DataElement for f32 {
    const DATA_TYPE: NiftiType = NiftiType::Float32;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_f32().map_err(From::from)
    }
}
impl DataElement for f64 {
    const DATA_TYPE: NiftiType = NiftiType::Float64;
    fn from_raw<R>(src: R, e: Endianness) -> Result<Self>
    where
        R: Read,
    {
        ByteOrdered::runtime(src, e).read_f64().map_err(From::from)
    }
}
