//! Addressing of volume slices inside a set of atlas images.
//!
//! Each atlas is a grid of `slices_per_row × slices_per_column` tiles, one
//! slice per tile. Slices fill the first atlas in reading order (left to
//! right, then top to bottom), then the next atlas, and so on; the last
//! atlas may be partially filled.
//!
//! Rows of an [`AtlasAddress`] are counted from the geometric bottom of the
//! atlas image, which is also where normalized texture coordinates start
//! (`v = 0`). Slice 0 is therefore in the top left tile, at the highest row.
//!
//! [`AtlasAddress`]: ./struct.AtlasAddress.html
use crate::error::{MosaicError, Result};
use crate::util::{floor_index, round_index};
use tracing::debug;

/// The location of one slice: which atlas, and which tile in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasAddress {
    /// Index of the atlas holding the slice.
    pub atlas: usize,
    /// Tile row, counted from the bottom of the atlas.
    pub row: usize,
    /// Tile column, counted from the left of the atlas.
    pub col: usize,
    slices_per_column: usize,
}

impl AtlasAddress {
    /// Tile row counted from the top of the atlas, i.e. in reading order.
    pub fn grid_row(&self) -> usize {
        self.slices_per_column - 1 - self.row
    }
}

/// A normalized rectangle of an atlas texture, `[u0, u1) × [v0, v1)`, with
/// `v` growing upwards from the bottom of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRegion {
    /// Left edge.
    pub u0: f64,
    /// Bottom edge.
    pub v0: f64,
    /// Right edge.
    pub u1: f64,
    /// Top edge.
    pub v1: f64,
}

impl PixelRegion {
    /// Width of the region in normalized units.
    pub fn width(&self) -> f64 {
        self.u1 - self.u0
    }

    /// Height of the region in normalized units.
    pub fn height(&self) -> f64 {
        self.v1 - self.v0
    }

    /// Map a fractional in-slice position `(fx, fy)`, both in `[0, 1]`, to
    /// a texture coordinate inside this region.
    ///
    /// World Y and tile rows grow in opposite directions, so `fy = 0` lands
    /// on the top edge of the region.
    pub fn texture_coordinate(&self, fx: f64, fy: f64) -> (f64, f64) {
        let h = self.height();
        (self.u0 + fx * self.width(), self.v0 + (h - fy * h))
    }

    /// The pixel rectangle covered by this region on an atlas image of the
    /// given size, in image coordinates (row 0 at the top).
    pub fn to_pixels(&self, width: usize, height: usize) -> PixelRect {
        let (w, h) = (width as f64, height as f64);
        let x0 = round_index(self.u0 * w).max(0) as usize;
        let x1 = round_index(self.u1 * w).max(0) as usize;
        let y0 = round_index((1. - self.v1) * h).max(0) as usize;
        let y1 = round_index((1. - self.v0) * h).max(0) as usize;
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

/// An integer pixel rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl PixelRect {
    /// The pixel under the texture coordinate `(u, v)` of an atlas image of
    /// the given size, clamped to this rectangle.
    pub fn pixel_at(&self, u: f64, v: f64, width: usize, height: usize) -> (usize, usize) {
        let px = clamp_index(floor_index(u * width as f64), self.x, self.width);
        let py = clamp_index(floor_index((1. - v) * height as f64), self.y, self.height);
        (px, py)
    }
}

fn clamp_index(i: i64, start: usize, len: usize) -> usize {
    let last = (start + len.max(1) - 1) as i64;
    i.max(start as i64).min(last) as usize
}

/// Grid geometry of a multi-atlas slice packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasLayout {
    slices_per_row: usize,
    slices_per_column: usize,
    total_slices: usize,
}

impl AtlasLayout {
    /// Create a new layout.
    ///
    /// # Errors
    ///
    /// - `MosaicError::InvalidLayout` if any parameter is zero.
    pub fn new(slices_per_row: usize, slices_per_column: usize, total_slices: usize) -> Result<Self> {
        if slices_per_row == 0 || slices_per_column == 0 {
            return Err(MosaicError::InvalidLayout("the slice grid must not be empty"));
        }
        if total_slices == 0 {
            return Err(MosaicError::InvalidLayout("there must be at least one slice"));
        }
        let layout = AtlasLayout {
            slices_per_row,
            slices_per_column,
            total_slices,
        };
        debug!(
            slices_per_row,
            slices_per_column,
            total_slices,
            atlases = layout.num_atlases(),
            "built atlas layout"
        );
        Ok(layout)
    }

    /// Choose the largest grid that fits tiles of `tile_width × tile_height`
    /// pixels into square atlases no wider than `max_side` pixels.
    pub fn for_texture_limit(
        tile_width: usize,
        tile_height: usize,
        total_slices: usize,
        max_side: usize,
    ) -> Result<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(MosaicError::InvalidLayout("tiles must not be empty"));
        }
        let per_row = max_side / tile_width;
        let per_column = max_side / tile_height;
        if per_row == 0 || per_column == 0 {
            return Err(MosaicError::InvalidLayout("a slice does not fit in one atlas"));
        }
        // no point in reserving more rows than a single atlas needs
        let per_column = per_column.min((total_slices + per_row - 1) / per_row).max(1);
        AtlasLayout::new(per_row, per_column, total_slices)
    }

    /// Number of tile columns per atlas.
    pub fn slices_per_row(&self) -> usize {
        self.slices_per_row
    }

    /// Number of tile rows per atlas.
    pub fn slices_per_column(&self) -> usize {
        self.slices_per_column
    }

    /// Number of slices packed over all atlases.
    pub fn total_slices(&self) -> usize {
        self.total_slices
    }

    /// Number of slices one atlas can hold.
    pub fn atlas_capacity(&self) -> usize {
        self.slices_per_row * self.slices_per_column
    }

    /// Number of atlases needed to hold all slices.
    pub fn num_atlases(&self) -> usize {
        let capacity = self.atlas_capacity();
        (self.total_slices + capacity - 1) / capacity
    }

    /// Resolve a global slice index into its atlas and tile.
    ///
    /// # Errors
    ///
    /// - `MosaicError::SliceIndexOutOfRange` if `slice` is negative or not
    /// below the total slice count.
    pub fn slice_to_address(&self, slice: i64) -> Result<AtlasAddress> {
        if slice < 0 || slice as usize >= self.total_slices {
            return Err(MosaicError::SliceIndexOutOfRange(slice, self.total_slices));
        }
        let slice = slice as usize;
        let capacity = self.atlas_capacity();
        let atlas = slice / capacity;
        let local = slice - atlas * capacity;
        Ok(AtlasAddress {
            atlas,
            row: self.slices_per_column - 1 - local / self.slices_per_row,
            col: local % self.slices_per_row,
            slices_per_column: self.slices_per_column,
        })
    }

    /// The normalized region of the tile at the given address.
    pub fn pixel_region(&self, address: &AtlasAddress) -> PixelRegion {
        let w = 1. / self.slices_per_row as f64;
        let h = 1. / self.slices_per_column as f64;
        PixelRegion {
            u0: address.col as f64 * w,
            v0: address.row as f64 * h,
            u1: (address.col + 1) as f64 * w,
            v1: (address.row + 1) as f64 * h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn counts() {
        let layout = AtlasLayout::new(4, 4, 20).unwrap();
        assert_eq!(layout.atlas_capacity(), 16);
        assert_eq!(layout.num_atlases(), 2);
        assert_eq!(AtlasLayout::new(4, 4, 16).unwrap().num_atlases(), 1);
        assert!(AtlasLayout::new(0, 4, 16).is_err());
        assert!(AtlasLayout::new(4, 4, 0).is_err());
    }

    #[test]
    fn rows_are_bottom_up() {
        let layout = AtlasLayout::new(3, 2, 6).unwrap();
        let a = layout.slice_to_address(0).unwrap();
        assert_eq!((a.atlas, a.row, a.col, a.grid_row()), (0, 1, 0, 0));
        let a = layout.slice_to_address(4).unwrap();
        assert_eq!((a.atlas, a.row, a.col, a.grid_row()), (0, 0, 1, 1));
    }

    #[test]
    fn out_of_range() {
        let layout = AtlasLayout::new(4, 4, 20).unwrap();
        assert!(layout.slice_to_address(-1).is_err());
        match layout.slice_to_address(20) {
            Err(MosaicError::SliceIndexOutOfRange(20, 20)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bijection() {
        for &(r, c, n) in &[(4, 4, 20), (3, 5, 47), (1, 1, 7), (8, 2, 16)] {
            let layout = AtlasLayout::new(r, c, n).unwrap();
            let set: HashSet<_> = (0..n as i64)
                .map(|i| {
                    let a = layout.slice_to_address(i).unwrap();
                    (a.atlas, a.row, a.col)
                })
                .collect();
            assert_eq!(set.len(), n);
        }
    }

    #[test]
    fn region_and_texture_coordinates() {
        let layout = AtlasLayout::new(4, 2, 8).unwrap();
        let a = layout.slice_to_address(5).unwrap();
        let region = layout.pixel_region(&a);
        assert_eq!(region, PixelRegion { u0: 0.25, v0: 0., u1: 0.5, v1: 0.5 });
        assert_eq!(region.texture_coordinate(0., 0.), (0.25, 0.5));
        assert_eq!(region.texture_coordinate(1., 1.), (0.5, 0.));

        let rect = region.to_pixels(40, 20);
        assert_eq!(rect, PixelRect { x: 10, y: 10, width: 10, height: 10 });
        // the far edges clamp back into the tile
        assert_eq!(rect.pixel_at(0.5, 0., 40, 20), (19, 19));
        assert_eq!(rect.pixel_at(0.25, 0.5, 40, 20), (10, 10));
    }

    #[test]
    fn texture_limit() {
        let layout = AtlasLayout::for_texture_limit(64, 64, 100, 512).unwrap();
        assert_eq!(layout.slices_per_row(), 8);
        assert_eq!(layout.slices_per_column(), 8);
        assert_eq!(layout.num_atlases(), 2);

        let layout = AtlasLayout::for_texture_limit(64, 64, 10, 512).unwrap();
        assert_eq!(layout.slices_per_column(), 2);
        assert_eq!(layout.num_atlases(), 1);

        assert!(AtlasLayout::for_texture_limit(1024, 64, 10, 512).is_err());
    }
}
