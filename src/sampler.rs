//! Sampling of a volume through its atlas representation.
//!
//! A query point is first moved into the *shifted* frame, where the volume
//! box spans `[0, extents]` along each axis. Points outside the box resolve
//! to [`SampleResult::Outside`], points within `edge_margin` of any face to
//! [`SampleResult::Edge`], and everything else is looked up in the atlases,
//! either at the nearest voxel or trilinearly between the eight surrounding
//! lattice points.
//!
//! [`SampleResult::Outside`]: ./enum.SampleResult.html#variant.Outside
//! [`SampleResult::Edge`]: ./enum.SampleResult.html#variant.Edge
use crate::affine::AffineTransform;
use crate::atlas::AtlasSet;
use crate::error::{MosaicError, Result};
use crate::header::NiftiHeader;
use crate::util::{floor_index, lattice_fraction};
use crate::volume::{Dim3, Texel};
use nalgebra::{Point3, Vector3};
use rgb::RGBA;
use tracing::debug;

/// How a query point relates to the volume box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFrame {
    /// Points are relative to the centre of the volume box, which spans
    /// `[-extents / 2, extents / 2]`.
    Centered,
    /// Points are scanner coordinates, mapped to voxel indices by the
    /// inverse of the voxel-to-world transform.
    Scanner,
}

impl Default for SampleFrame {
    fn default() -> Self {
        SampleFrame::Centered
    }
}

/// The interpolation mode of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// The value of the voxel containing the point.
    Nearest,
    /// Weighted mix of the eight surrounding lattice points.
    Trilinear,
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Nearest
    }
}

/// Tunable parameters of a sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Width of the band inside each face of the box, in world units,
    /// reported as an edge.
    pub edge_margin: f64,
    /// Color rendered for samples in the edge band.
    pub edge_color: RGBA<f64>,
    /// Frame of the query points.
    pub frame: SampleFrame,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            edge_margin: 0.5,
            edge_color: RGBA::new(0.7, 0.7, 1.0, 1.0),
            frame: SampleFrame::Centered,
        }
    }
}

impl SamplerConfig {
    /// Replace the edge margin.
    pub fn with_edge_margin(mut self, edge_margin: f64) -> Self {
        self.edge_margin = edge_margin;
        self
    }

    /// Replace the edge color.
    pub fn with_edge_color(mut self, edge_color: RGBA<f64>) -> Self {
        self.edge_color = edge_color;
        self
    }

    /// Replace the query frame.
    pub fn with_frame(mut self, frame: SampleFrame) -> Self {
        self.frame = frame;
        self
    }
}

/// A point to sample, with its interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleQuery {
    /// The point, in the sampler's frame.
    pub point: Point3<f64>,
    /// The interpolation mode.
    pub interpolation: Interpolation,
}

impl SampleQuery {
    /// Create a query.
    pub fn new(point: Point3<f64>, interpolation: Interpolation) -> Self {
        SampleQuery {
            point,
            interpolation,
        }
    }

    /// A nearest neighbour query at `(x, y, z)`.
    pub fn nearest(x: f64, y: f64, z: f64) -> Self {
        SampleQuery::new(Point3::new(x, y, z), Interpolation::Nearest)
    }

    /// A trilinear query at `(x, y, z)`.
    pub fn trilinear(x: f64, y: f64, z: f64) -> Self {
        SampleQuery::new(Point3::new(x, y, z), Interpolation::Trilinear)
    }
}

/// The outcome of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleResult {
    /// The (rescaled) value at the point, one entry per component.
    Value(Texel),
    /// The point lies in the band along the faces of the box.
    Edge,
    /// The point lies outside the box.
    Outside,
}

impl SampleResult {
    /// The sampled value, if any.
    pub fn value(&self) -> Option<&Texel> {
        match self {
            SampleResult::Value(t) => Some(t),
            _ => None,
        }
    }

    /// Whether the point fell in the edge band.
    pub fn is_edge(&self) -> bool {
        *self == SampleResult::Edge
    }

    /// Whether the point fell outside the box.
    pub fn is_outside(&self) -> bool {
        *self == SampleResult::Outside
    }

    /// Map the result to a color. Scalar values are rendered grey, color
    /// values as they are with an opaque alpha unless they carry their own.
    /// Outside points are fully transparent.
    pub fn to_rgba(&self, edge_color: RGBA<f64>) -> RGBA<f64> {
        match self {
            SampleResult::Outside => RGBA::new(0., 0., 0., 0.),
            SampleResult::Edge => edge_color,
            SampleResult::Value(t) => match t.as_slice() {
                [v] => RGBA::new(*v, *v, *v, 1.),
                [v, a] => RGBA::new(*v, *v, *v, *a),
                [r, g, b] => RGBA::new(*r, *g, *b, 1.),
                [r, g, b, a, ..] => RGBA::new(*r, *g, *b, *a),
                [] => RGBA::new(0., 0., 0., 0.),
            },
        }
    }
}

/// Spatial description of a sampled volume: its shape and its
/// voxel-to-world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGeometry {
    dim: Dim3,
    transform: AffineTransform,
    spacing: [f64; 3],
    extents: [f64; 3],
}

impl VolumeGeometry {
    /// Create the geometry of a volume. The voxel spacing is taken from the
    /// transform.
    pub fn new(dim: Dim3, transform: AffineTransform) -> Self {
        let spacing = transform.spacing();
        let extents = [
            dim.nx() as f64 * spacing[0],
            dim.ny() as f64 * spacing[1],
            dim.nz() as f64 * spacing[2],
        ];
        VolumeGeometry {
            dim,
            transform,
            spacing,
            extents,
        }
    }

    /// Derive the geometry of the volume described by a header.
    pub fn from_header(header: &NiftiHeader) -> Result<Self> {
        Ok(VolumeGeometry::new(
            header.dim3()?,
            AffineTransform::from_header(header)?,
        ))
    }

    /// The shape of the volume.
    pub fn dim(&self) -> Dim3 {
        self.dim
    }

    /// The voxel-to-world transform.
    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// World length of one voxel along each axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// World length of the volume box along each axis.
    pub fn extents(&self) -> [f64; 3] {
        self.extents
    }

    /// The query point which lands exactly on the lattice point of voxel
    /// `idx`, in the given frame.
    pub fn voxel_point(&self, idx: [usize; 3], frame: SampleFrame) -> Point3<f64> {
        let v = Point3::new(idx[0] as f64, idx[1] as f64, idx[2] as f64);
        match frame {
            SampleFrame::Centered => Point3::new(
                v.x * self.spacing[0] - self.extents[0] / 2.,
                v.y * self.spacing[1] - self.extents[1] / 2.,
                v.z * self.spacing[2] - self.extents[2] / 2.,
            ),
            SampleFrame::Scanner => self.transform.voxel_to_world(&v),
        }
    }

    /// Move a query point into the shifted frame, where the box spans
    /// `[0, extents]`.
    pub fn to_shifted(&self, point: &Point3<f64>, frame: SampleFrame) -> Vector3<f64> {
        let spacing = Vector3::from(self.spacing);
        match frame {
            SampleFrame::Centered => point.coords + Vector3::from(self.extents) / 2.,
            SampleFrame::Scanner => self
                .transform
                .world_to_voxel(point)
                .coords
                .component_mul(&spacing),
        }
    }
}

/// Samples a volume through its atlases.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSampler {
    geometry: VolumeGeometry,
    atlases: AtlasSet,
    config: SamplerConfig,
}

impl VolumeSampler {
    /// Create a sampler.
    ///
    /// # Errors
    ///
    /// - `MosaicError::InvalidLayout` if the atlas layout does not hold one
    /// slice per volume slice, or the edge margin is negative.
    pub fn new(geometry: VolumeGeometry, atlases: AtlasSet, config: SamplerConfig) -> Result<Self> {
        if atlases.layout().total_slices() != geometry.dim().nz() {
            return Err(MosaicError::InvalidLayout(
                "atlas slice count differs from the volume depth",
            ));
        }
        if !(config.edge_margin >= 0.) {
            return Err(MosaicError::InvalidLayout("the edge margin must not be negative"));
        }
        debug!(
            dim = ?geometry.dim().as_ref(),
            extents = ?geometry.extents(),
            atlases = atlases.len(),
            edge_margin = config.edge_margin,
            frame = ?config.frame,
            "built volume sampler"
        );
        Ok(VolumeSampler {
            geometry,
            atlases,
            config,
        })
    }

    /// The geometry of the sampled volume.
    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    /// The atlases sampled from.
    pub fn atlases(&self) -> &AtlasSet {
        &self.atlases
    }

    /// The sampler parameters.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample the volume at a query point.
    ///
    /// # Errors
    ///
    /// - `MosaicError::UnknownAtlasIndex` if the point resolves to a slice
    /// whose atlas is not held by the atlas set.
    pub fn sample(&self, query: &SampleQuery) -> Result<SampleResult> {
        self.sample_at(&query.point, query.interpolation)
    }

    /// Sample the volume at a point, in the configured frame.
    pub fn sample_at(&self, point: &Point3<f64>, interpolation: Interpolation) -> Result<SampleResult> {
        let shifted = self.geometry.to_shifted(point, self.config.frame);
        self.sample_shifted(&shifted, interpolation)
    }

    /// Sample the volume at a point of the shifted frame.
    pub fn sample_shifted(
        &self,
        shifted: &Vector3<f64>,
        interpolation: Interpolation,
    ) -> Result<SampleResult> {
        let extents = self.geometry.extents;
        let outside = (0..3).any(|a| !(shifted[a] >= 0. && shifted[a] <= extents[a]));
        if outside {
            return Ok(SampleResult::Outside);
        }
        let margin = self.config.edge_margin;
        if (0..3).any(|a| shifted[a] < margin || shifted[a] > extents[a] - margin) {
            return Ok(SampleResult::Edge);
        }
        let texel = match interpolation {
            Interpolation::Nearest => self.nearest(shifted)?,
            Interpolation::Trilinear => self.trilinear(shifted)?,
        };
        Ok(SampleResult::Value(texel))
    }

    /// The value of the voxel containing a point of the shifted frame,
    /// fetched from its atlas tile.
    fn nearest(&self, shifted: &Vector3<f64>) -> Result<Texel> {
        let nz = self.geometry.dim.nz() as i64;
        let slice = floor_index(shifted.z / self.geometry.spacing[2]).max(0).min(nz - 1);
        let address = self.atlases.layout().slice_to_address(slice)?;
        let fx = (shifted.x / self.geometry.extents[0]).max(0.).min(1.);
        let fy = (shifted.y / self.geometry.extents[1]).max(0.).min(1.);
        self.atlases.fetch(&address, fx, fy)
    }

    /// The value at a lattice point, or zero if the point lies outside the
    /// volume.
    fn lattice_value(&self, idx: [i64; 3]) -> Result<Texel> {
        let dim = self.geometry.dim;
        if !dim.contains(idx) {
            return Ok(Texel::zero(self.atlases.channels()));
        }
        let address = self.atlases.layout().slice_to_address(idx[2])?;
        let fx = idx[0] as f64 / dim.nx() as f64;
        let fy = idx[1] as f64 / dim.ny() as f64;
        self.atlases.fetch(&address, fx, fy)
    }

    fn trilinear(&self, shifted: &Vector3<f64>) -> Result<Texel> {
        let spacing = self.geometry.spacing;
        let mut base = [0i64; 3];
        let mut frac = [0f64; 3];
        for a in 0..3 {
            let p = shifted[a] / spacing[a];
            base[a] = floor_index(p);
            frac[a] = lattice_fraction(p, base[a]);
        }

        let mut out = Texel::zero(self.atlases.channels());
        for corner in 0..8 {
            let mut idx = base;
            let mut weight = 1.;
            for a in 0..3 {
                if corner & (1 << a) != 0 {
                    idx[a] += 1;
                    weight *= frac[a];
                } else {
                    weight *= 1. - frac[a];
                }
            }
            if weight == 0. {
                continue;
            }
            out.add_weighted(&self.lattice_value(idx)?, weight);
        }
        Ok(out)
    }
}
