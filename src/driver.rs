//! Batch sampling over many points.
//!
//! Samples are independent reads of shared, immutable data, so batches are
//! evaluated in parallel with `rayon`. Results come back in input order; the
//! first failing sample fails the whole batch.
use crate::error::Result;
use crate::sampler::{Interpolation, SampleQuery, SampleResult, VolumeSampler};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use rgb::RGBA;
use tracing::instrument;

/// A regular planar grid of query points: pixel `(x, y)` of the grid is
/// sampled at `origin + x * u_step + y * v_step`, rows first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePlane {
    /// Point sampled for the pixel `(0, 0)`.
    pub origin: Point3<f64>,
    /// Step between horizontally adjacent pixels.
    pub u_step: Vector3<f64>,
    /// Step between vertically adjacent pixels.
    pub v_step: Vector3<f64>,
    /// Number of pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl SamplePlane {
    /// Create a plane.
    pub fn new(
        origin: Point3<f64>,
        u_step: Vector3<f64>,
        v_step: Vector3<f64>,
        width: usize,
        height: usize,
    ) -> Self {
        SamplePlane {
            origin,
            u_step,
            v_step,
            width,
            height,
        }
    }

    /// An axial plane (constant Z) covering `[x0, x0 + width * step)` and
    /// `[y0, y0 + height * step)` in steps of `step`.
    pub fn axial(x0: f64, y0: f64, z: f64, step: f64, width: usize, height: usize) -> Self {
        SamplePlane::new(
            Point3::new(x0, y0, z),
            Vector3::new(step, 0., 0.),
            Vector3::new(0., step, 0.),
            width,
            height,
        )
    }

    /// Number of pixels of the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Whether the grid has no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The point sampled for pixel `(x, y)`.
    pub fn point(&self, x: usize, y: usize) -> Point3<f64> {
        self.origin + self.u_step * x as f64 + self.v_step * y as f64
    }
}

/// Evaluates batches of samples on a shared sampler.
#[derive(Debug, Clone, Copy)]
pub struct SamplingDriver<'a> {
    sampler: &'a VolumeSampler,
}

impl<'a> SamplingDriver<'a> {
    /// Create a driver over the given sampler.
    pub fn new(sampler: &'a VolumeSampler) -> Self {
        SamplingDriver { sampler }
    }

    /// The sampler used.
    pub fn sampler(&self) -> &'a VolumeSampler {
        self.sampler
    }

    /// Evaluate a single query.
    pub fn sample(&self, query: &SampleQuery) -> Result<SampleResult> {
        self.sampler.sample(query)
    }

    /// Evaluate a list of queries, each with its own interpolation mode.
    #[instrument(skip_all, fields(queries = queries.len()))]
    pub fn sample_queries(&self, queries: &[SampleQuery]) -> Result<Vec<SampleResult>> {
        queries.par_iter().map(|q| self.sampler.sample(q)).collect()
    }

    /// Evaluate a list of points with one interpolation mode.
    #[instrument(skip_all, fields(points = points.len()))]
    pub fn sample_points(
        &self,
        points: &[Point3<f64>],
        interpolation: Interpolation,
    ) -> Result<Vec<SampleResult>> {
        points
            .par_iter()
            .map(|p| self.sampler.sample_at(p, interpolation))
            .collect()
    }

    /// Evaluate every pixel of a plane, in row-major order.
    #[instrument(skip_all, fields(width = plane.width, height = plane.height))]
    pub fn sample_plane(
        &self,
        plane: &SamplePlane,
        interpolation: Interpolation,
    ) -> Result<Vec<SampleResult>> {
        let width = plane.width;
        (0..plane.len())
            .into_par_iter()
            .map(|n| {
                let point = plane.point(n % width, n / width);
                self.sampler.sample_at(&point, interpolation)
            })
            .collect()
    }

    /// Render every pixel of a plane to a color, in row-major order.
    /// Edge pixels take the configured edge color and pixels outside the
    /// volume are transparent.
    #[instrument(skip_all, fields(width = plane.width, height = plane.height))]
    pub fn render_rgba(
        &self,
        plane: &SamplePlane,
        interpolation: Interpolation,
    ) -> Result<Vec<RGBA<f64>>> {
        let edge_color = self.sampler.config().edge_color;
        let results = self.sample_plane(plane, interpolation)?;
        Ok(results.iter().map(|r| r.to_rgba(edge_color)).collect())
    }

    /// Render every pixel of a plane to an array of shape
    /// `[height, width, 4]` holding RGBA components.
    #[cfg(feature = "ndarray_volumes")]
    #[instrument(skip_all, fields(width = plane.width, height = plane.height))]
    pub fn sample_plane_ndarray(
        &self,
        plane: &SamplePlane,
        interpolation: Interpolation,
    ) -> Result<::ndarray::Array3<f64>> {
        let pixels = self.render_rgba(plane, interpolation)?;
        let mut out = ::ndarray::Array3::zeros((plane.height, plane.width, 4));
        for (n, c) in pixels.iter().enumerate() {
            let (x, y) = (n % plane.width, n / plane.width);
            out[[y, x, 0]] = c.r;
            out[[y, x, 1]] = c.g;
            out[[y, x, 2]] = c.b;
            out[[y, x, 3]] = c.a;
        }
        Ok(out)
    }
}
