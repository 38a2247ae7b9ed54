//! Atlas images: 2D mosaics of volume slices, and the set of atlases a
//! volume is packed into.
//!
//! Atlas pixels are stored in image order (row 0 at the top), with the
//! components of each pixel interleaved. Tiles are addressed through an
//! [`AtlasLayout`]; the set dispatches an atlas index to its image in
//! constant time and refuses indices it does not hold.
//!
//! [`AtlasLayout`]: ./layout/struct.AtlasLayout.html

pub mod layout;

pub use self::layout::{AtlasAddress, AtlasLayout, PixelRect, PixelRegion};

use crate::error::{MosaicError, Result};
use crate::volume::element::{Texel, MAX_COMPONENTS};
use crate::volume::Volume;
use rayon::prelude::*;
use tracing::{debug, warn};

/// A single atlas image.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasImage {
    width: usize,
    height: usize,
    channels: usize,
    texels: Vec<f64>,
}

impl AtlasImage {
    /// Create an atlas image from its interleaved pixel values, row 0 first.
    ///
    /// # Errors
    ///
    /// - `MosaicError::InvalidLayout` if the image is empty or the channel
    /// count is not supported.
    /// - `MosaicError::IncompatibleLength` if `texels` does not hold
    /// `width * height * channels` values.
    pub fn new(width: usize, height: usize, channels: usize, texels: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MosaicError::InvalidLayout("atlas images must not be empty"));
        }
        if channels == 0 || channels > MAX_COMPONENTS {
            return Err(MosaicError::InvalidLayout("unsupported number of atlas channels"));
        }
        let expected = width * height * channels;
        if texels.len() != expected {
            return Err(MosaicError::IncompatibleLength(texels.len(), expected));
        }
        Ok(AtlasImage {
            width,
            height,
            channels,
            texels,
        })
    }

    fn zeros(width: usize, height: usize, channels: usize) -> Self {
        AtlasImage {
            width,
            height,
            channels,
            texels: vec![0.; width * height * channels],
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of components per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The interleaved pixel values.
    pub fn texels(&self) -> &[f64] {
        &self.texels
    }

    /// The pixel at column `x`, row `y` (from the top), if inside the image.
    pub fn texel(&self, x: usize, y: usize) -> Option<Texel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        Some(Texel::from_slice(&self.texels[start..start + self.channels]))
    }

    fn set_texel(&mut self, x: usize, y: usize, texel: &Texel) {
        let start = (y * self.width + x) * self.channels;
        self.texels[start..start + self.channels].copy_from_slice(texel.as_slice());
    }
}

/// The atlases holding every slice of a volume, with their layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasSet {
    layout: AtlasLayout,
    images: Vec<AtlasImage>,
}

impl AtlasSet {
    /// Assemble a set from already decoded atlas images.
    ///
    /// All images must share the same size and channel count, and their
    /// size must be a multiple of the tile grid. Holding fewer images than
    /// the layout requires is allowed; slices in the missing atlases fail
    /// to resolve when sampled.
    pub fn new(layout: AtlasLayout, images: Vec<AtlasImage>) -> Result<Self> {
        let first = images
            .first()
            .ok_or(MosaicError::InvalidLayout("an atlas set needs at least one image"))?;
        let (width, height, channels) = (first.width, first.height, first.channels);
        if images
            .iter()
            .any(|i| i.width != width || i.height != height || i.channels != channels)
        {
            return Err(MosaicError::InvalidLayout("atlas images differ in size or channels"));
        }
        if width % layout.slices_per_row() != 0 || height % layout.slices_per_column() != 0 {
            return Err(MosaicError::InvalidLayout(
                "atlas size is not a multiple of the slice grid",
            ));
        }
        if images.len() < layout.num_atlases() {
            warn!(
                available = images.len(),
                required = layout.num_atlases(),
                "atlas set is missing atlases"
            );
        }
        debug!(atlases = images.len(), width, height, channels, "built atlas set");
        Ok(AtlasSet { layout, images })
    }

    /// Pack every slice of a volume into atlases of the given grid. Each
    /// tile is `nx × ny` pixels, unused tiles are left at zero.
    pub fn pack<V>(volume: &V, slices_per_row: usize, slices_per_column: usize) -> Result<Self>
    where
        V: Volume + Sync,
    {
        let layout = AtlasLayout::new(slices_per_row, slices_per_column, volume.dim().nz())?;
        AtlasSet::pack_with_layout(volume, layout)
    }

    /// Pack every slice of a volume following the given layout, which must
    /// hold exactly as many slices as the volume has.
    pub fn pack_with_layout<V>(volume: &V, layout: AtlasLayout) -> Result<Self>
    where
        V: Volume + Sync,
    {
        let dim = volume.dim();
        if layout.total_slices() != dim.nz() {
            return Err(MosaicError::InvalidLayout(
                "layout slice count differs from the volume depth",
            ));
        }
        let (nx, ny) = (dim.nx(), dim.ny());
        let channels = volume.element_stride();
        let capacity = layout.atlas_capacity();

        let images = (0..layout.num_atlases())
            .into_par_iter()
            .map(|atlas| -> Result<AtlasImage> {
                let mut image = AtlasImage::zeros(
                    nx * layout.slices_per_row(),
                    ny * layout.slices_per_column(),
                    channels,
                );
                let first = atlas * capacity;
                let last = (first + capacity).min(dim.nz());
                for k in first..last {
                    let address = layout.slice_to_address(k as i64)?;
                    let x0 = address.col * nx;
                    let y0 = address.grid_row() * ny;
                    for j in 0..ny {
                        for i in 0..nx {
                            let texel = volume.get_texel([i, j, k])?;
                            image.set_texel(x0 + i, y0 + j, &texel);
                        }
                    }
                }
                Ok(image)
            })
            .collect::<Result<Vec<_>>>()?;

        AtlasSet::new(layout, images)
    }

    /// The layout of this set.
    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    /// Number of atlas images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the set holds no images. Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of components per pixel.
    pub fn channels(&self) -> usize {
        self.images[0].channels
    }

    /// All atlas images, in atlas index order.
    pub fn images(&self) -> &[AtlasImage] {
        &self.images
    }

    /// Dispatch an atlas index to its image.
    ///
    /// # Errors
    ///
    /// - `MosaicError::UnknownAtlasIndex` if the set does not hold that atlas.
    pub fn atlas(&self, index: usize) -> Result<&AtlasImage> {
        self.images
            .get(index)
            .ok_or(MosaicError::UnknownAtlasIndex(index, self.images.len()))
    }

    /// Fetch the pixel at the fractional in-slice position `(fx, fy)` of the
    /// tile at `address`. The position is mapped to a texture coordinate of
    /// the tile's region, then to the pixel containing it.
    pub fn fetch(&self, address: &AtlasAddress, fx: f64, fy: f64) -> Result<Texel> {
        let image = self.atlas(address.atlas)?;
        let region = self.layout.pixel_region(address);
        let (u, v) = region.texture_coordinate(fx, fy);
        let rect = region.to_pixels(image.width, image.height);
        let (x, y) = rect.pixel_at(u, v, image.width, image.height);
        image
            .texel(x, y)
            .ok_or(MosaicError::OutOfBounds([x, y, address.atlas]))
    }
}
