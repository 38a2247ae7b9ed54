//! Module holding an in-memory implementation of a volume.

use super::element::{DataElement, Rescale, Texel};
use super::shape::Dim3;
use super::Volume;
use crate::error::{MosaicError, Result};
use crate::header::NiftiHeader;
use crate::typedef::NiftiType;
use crate::util::Endianness;
use num_traits::AsPrimitive;
use rgb::{FromSlice, RGB8};
use tracing::debug;

/// The typed element array backing a volume, one variant per supported
/// element type. Packed color volumes hold one `RGB8` triple per voxel.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    /// unsigned char.
    Uint8(Vec<u8>),
    /// signed char.
    Int8(Vec<i8>),
    /// unsigned short.
    Uint16(Vec<u16>),
    /// signed short.
    Int16(Vec<i16>),
    /// unsigned int.
    Uint32(Vec<u32>),
    /// signed int.
    Int32(Vec<i32>),
    /// 32 bit float.
    Float32(Vec<f32>),
    /// 64 bit float.
    Float64(Vec<f64>),
    /// 3 8 bit bytes.
    Rgb24(Vec<RGB8>),
}

impl VolumeData {
    /// Decode a raw byte buffer holding elements of the given type.
    ///
    /// # Errors
    ///
    /// - `MosaicError::UnsupportedElementType` if the type cannot be sampled.
    /// - `MosaicError::IncompatibleLength` if the buffer does not hold a
    /// whole number of elements.
    pub fn from_raw_bytes(
        datatype: NiftiType,
        bytes: Vec<u8>,
        endianness: Endianness,
    ) -> Result<Self> {
        Ok(match datatype {
            NiftiType::Uint8 => VolumeData::Uint8(u8::from_raw_vec(bytes, endianness)?),
            NiftiType::Int8 => VolumeData::Int8(i8::from_raw_vec(bytes, endianness)?),
            NiftiType::Uint16 => VolumeData::Uint16(u16::from_raw_vec(bytes, endianness)?),
            NiftiType::Int16 => VolumeData::Int16(i16::from_raw_vec(bytes, endianness)?),
            NiftiType::Uint32 => VolumeData::Uint32(u32::from_raw_vec(bytes, endianness)?),
            NiftiType::Int32 => VolumeData::Int32(i32::from_raw_vec(bytes, endianness)?),
            NiftiType::Float32 => VolumeData::Float32(f32::from_raw_vec(bytes, endianness)?),
            NiftiType::Float64 => VolumeData::Float64(f64::from_raw_vec(bytes, endianness)?),
            NiftiType::Rgb24 => {
                if bytes.len() % 3 != 0 {
                    return Err(MosaicError::IncompatibleLength(
                        bytes.len(),
                        bytes.len() / 3 * 3,
                    ));
                }
                VolumeData::Rgb24(bytes.as_rgb().to_vec())
            }
            t => return Err(MosaicError::UnsupportedElementType(t)),
        })
    }

    /// The element type held.
    pub fn data_type(&self) -> NiftiType {
        match self {
            VolumeData::Uint8(_) => NiftiType::Uint8,
            VolumeData::Int8(_) => NiftiType::Int8,
            VolumeData::Uint16(_) => NiftiType::Uint16,
            VolumeData::Int16(_) => NiftiType::Int16,
            VolumeData::Uint32(_) => NiftiType::Uint32,
            VolumeData::Int32(_) => NiftiType::Int32,
            VolumeData::Float32(_) => NiftiType::Float32,
            VolumeData::Float64(_) => NiftiType::Float64,
            VolumeData::Rgb24(_) => NiftiType::Rgb24,
        }
    }

    /// The number of voxels held.
    pub fn len(&self) -> usize {
        match self {
            VolumeData::Uint8(v) => v.len(),
            VolumeData::Int8(v) => v.len(),
            VolumeData::Uint16(v) => v.len(),
            VolumeData::Int16(v) => v.len(),
            VolumeData::Uint32(v) => v.len(),
            VolumeData::Int32(v) => v.len(),
            VolumeData::Float32(v) => v.len(),
            VolumeData::Float64(v) => v.len(),
            VolumeData::Rgb24(v) => v.len(),
        }
    }

    /// Whether no voxels are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn texel_at(&self, index: usize, rescale: &Rescale) -> Texel {
        match self {
            VolumeData::Uint8(v) => scalar_at(v, index, rescale),
            VolumeData::Int8(v) => scalar_at(v, index, rescale),
            VolumeData::Uint16(v) => scalar_at(v, index, rescale),
            VolumeData::Int16(v) => scalar_at(v, index, rescale),
            VolumeData::Uint32(v) => scalar_at(v, index, rescale),
            VolumeData::Int32(v) => scalar_at(v, index, rescale),
            VolumeData::Float32(v) => scalar_at(v, index, rescale),
            VolumeData::Float64(v) => scalar_at(v, index, rescale),
            // color triples are never rescaled
            VolumeData::Rgb24(v) => {
                let p = v[index];
                Texel::from_slice(&[f64::from(p.r), f64::from(p.g), f64::from(p.b)])
            }
        }
    }
}

#[inline]
fn scalar_at<T: DataElement>(values: &[T], index: usize, rescale: &Rescale) -> Texel {
    Texel::scalar(rescale.apply(values[index].as_()))
}

/// A volume fully contained in memory. Immutable once constructed: the
/// element array always holds exactly one element per voxel.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemVolume {
    dim: Dim3,
    spacing: [f64; 3],
    rescale: Rescale,
    data: VolumeData,
}

impl InMemVolume {
    /// Create a volume from its shape, voxel spacing and element array.
    ///
    /// # Errors
    ///
    /// - `MosaicError::IncompatibleLength` if the number of elements is not
    /// `nx * ny * nz`.
    pub fn new(dim: Dim3, spacing: [f64; 3], data: VolumeData) -> Result<Self> {
        Self::with_rescale(dim, spacing, data, Rescale::identity())
    }

    /// Create a volume whose values are rescaled on read.
    pub fn with_rescale(
        dim: Dim3,
        spacing: [f64; 3],
        data: VolumeData,
        rescale: Rescale,
    ) -> Result<Self> {
        let expected = dim.element_count();
        if data.len() != expected {
            return Err(MosaicError::IncompatibleLength(data.len(), expected));
        }
        debug!(
            dim = ?dim.as_ref(),
            datatype = ?data.data_type(),
            "built in-memory volume"
        );
        Ok(InMemVolume {
            dim,
            spacing,
            rescale,
            data,
        })
    }

    /// Create a volume from a decoded header and an element array. Shape,
    /// spacing and rescaling are taken from the header.
    ///
    /// # Errors
    ///
    /// - `MosaicError::UnsupportedElementType` if the header declares an
    /// element type which cannot be sampled.
    /// - `MosaicError::InvalidCode` if the header's `datatype` does not
    /// match the element array.
    pub fn from_header(header: &NiftiHeader, data: VolumeData) -> Result<Self> {
        let datatype = header.data_type()?;
        if !datatype.is_supported() {
            return Err(MosaicError::UnsupportedElementType(datatype));
        }
        if datatype != data.data_type() {
            return Err(MosaicError::InvalidCode("datatype", header.datatype));
        }
        Self::with_rescale(header.dim3()?, header.spacing(), data, header.rescale())
    }

    /// Create a volume from a decoded header and the raw bytes of its
    /// element array, stored with the given byte order.
    pub fn from_raw_bytes(
        header: &NiftiHeader,
        bytes: Vec<u8>,
        endianness: Endianness,
    ) -> Result<Self> {
        let dim = header.dim3()?;
        let datatype = header.data_type()?;
        let expected = dim.element_count() * datatype.size_of();
        if datatype.is_supported() && bytes.len() != expected {
            return Err(MosaicError::IncompatibleLength(bytes.len(), expected));
        }
        let data = VolumeData::from_raw_bytes(datatype, bytes, endianness)?;
        Self::from_header(header, data)
    }

    /// The rescaling applied on read.
    pub fn rescale(&self) -> Rescale {
        self.rescale
    }

    /// Retrieve a reference to the element array.
    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    /// Retrieve the element array, consuming the volume.
    pub fn into_data(self) -> VolumeData {
        self.data
    }
}

impl Volume for InMemVolume {
    fn dim(&self) -> Dim3 {
        self.dim
    }

    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    fn data_type(&self) -> NiftiType {
        self.data.data_type()
    }

    fn get_texel(&self, idx: [usize; 3]) -> Result<Texel> {
        let index = self.dim.linear_index(idx)?;
        Ok(self.data.texel_at(index, &self.rescale))
    }
}
