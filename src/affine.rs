//! The voxel-to-world coordinate transform.
//!
//! A volume's voxel index `(i, j, k)` maps to a world coordinate `(x, y, z)`
//! through a 4x4 affine `M`. The matrix is derived from the header in one of
//! three ways (see [`TransformMethod`]):
//!
//! - scale only: `M = diag(sx, sy, sz, 1)`;
//! - quaternion: `M = [R · diag(sx, sy, qfac · sz) | offset]`, where `R` is
//!   the rotation encoded by the quaternion parameters;
//! - raw affine: the `srow_*` rows of the header, verbatim.
//!
//! The inverse is computed once at construction, which fails on singular
//! matrices.
//!
//! [`TransformMethod`]: ../header/enum.TransformMethod.html
use crate::error::{MosaicError, Result};
use crate::header::{NiftiHeader, TransformMethod};
use approx::relative_eq;
use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, Vector3, Vector4};
use tracing::{debug, warn};

/// 3x3 linear part of an affine.
pub type Affine3 = Matrix3<f64>;
/// 4x4 homogeneous affine.
pub type Affine4 = Matrix4<f64>;

const QUATERNION_THRESHOLD: f64 = -(::std::f32::EPSILON as f64) * 3.0;

/// Determinants below this fraction of the product of the column norms of
/// the linear part are considered singular.
pub const SINGULAR_THRESHOLD: f64 = 1e-12;

/// The direction in which a transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From voxel index space to world space (`M`).
    VoxelToWorld,
    /// From world space to voxel index space (`M⁻¹`).
    WorldToVoxel,
}

/// An invertible voxel-to-world affine transform, holding both `M` and
/// `M⁻¹`.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    forward: Affine4,
    inverse: Affine4,
}

impl AffineTransform {
    /// Create a transform from a voxel-to-world matrix.
    ///
    /// # Errors
    ///
    /// - `MosaicError::SingularTransform` if the matrix cannot be inverted.
    pub fn new(matrix: Affine4) -> Result<Self> {
        let det = matrix.determinant();
        let linear = matrix.fixed_view::<3, 3>(0, 0);
        let scale: f64 = (0..3).map(|c| linear.column(c).norm()).product();
        if !det.is_finite() || det.abs() <= SINGULAR_THRESHOLD * scale {
            return Err(MosaicError::SingularTransform(det));
        }
        let inverse = matrix
            .try_inverse()
            .ok_or(MosaicError::SingularTransform(det))?;
        if !relative_eq!(matrix * inverse, Affine4::identity(), epsilon = 1e-9) {
            return Err(MosaicError::SingularTransform(det));
        }
        Ok(AffineTransform {
            forward: matrix,
            inverse,
        })
    }

    /// The transform for a volume without orientation information:
    /// `diag(sx, sy, sz, 1)`.
    pub fn scale_only(spacing: [f64; 3]) -> Result<Self> {
        AffineTransform::new(Affine4::new_nonuniform_scaling(&Vector3::from(spacing)))
    }

    /// Compose a transform from a rotation matrix, per-axis spacing, the
    /// handedness factor `qfac` (flipping the third axis when negative) and
    /// a translation.
    pub fn from_rotation(
        rotation: Affine3,
        spacing: [f64; 3],
        qfac: f64,
        offset: [f64; 3],
    ) -> Result<Self> {
        let qfac = if qfac < 0. { -1. } else { 1. };
        let scale = Affine3::from_diagonal(&Vector3::new(spacing[0], spacing[1], qfac * spacing[2]));
        let linear = rotation * scale;
        let mut matrix = linear.to_homogeneous();
        matrix[(0, 3)] = offset[0];
        matrix[(1, 3)] = offset[1];
        matrix[(2, 3)] = offset[2];
        AffineTransform::new(matrix)
    }

    /// Compose a transform from the `b, c, d` quaternion parameters, with
    /// the real part completed so that the quaternion has unit length.
    pub fn from_quaternion(
        bcd: [f64; 3],
        spacing: [f64; 3],
        qfac: f64,
        offset: [f64; 3],
    ) -> Result<Self> {
        let q = fill_positive(Vector3::from(bcd))?;
        AffineTransform::from_rotation(quaternion_to_affine(q), spacing, qfac, offset)
    }

    /// Derive the transform from a decoded header.
    pub fn from_header(header: &NiftiHeader) -> Result<Self> {
        let method = header.transform_method()?;
        debug!(?method, "deriving voxel-to-world transform");
        if method == TransformMethod::Quaternion && header.sform()?.is_known() {
            warn!(
                sform_code = header.sform_code,
                "both transforms are set, ignoring the sform"
            );
        }
        match method {
            TransformMethod::ScaleOnly => AffineTransform::scale_only(header.spacing()),
            TransformMethod::Quaternion => AffineTransform::from_quaternion(
                [
                    f64::from(header.quatern_b),
                    f64::from(header.quatern_c),
                    f64::from(header.quatern_d),
                ],
                header.spacing(),
                header.qfac(),
                [
                    f64::from(header.quatern_x),
                    f64::from(header.quatern_y),
                    f64::from(header.quatern_z),
                ],
            ),
            TransformMethod::RawAffine => {
                let (x, y, z) = (header.srow_x, header.srow_y, header.srow_z);
                let matrix = Matrix4::<f32>::new(
                    x[0], x[1], x[2], x[3],
                    y[0], y[1], y[2], y[3],
                    z[0], z[1], z[2], z[3],
                    0.0, 0.0, 0.0, 1.0,
                );
                AffineTransform::new(nalgebra::convert(matrix))
            }
        }
    }

    /// The voxel-to-world matrix `M`.
    pub fn matrix(&self) -> &Affine4 {
        &self.forward
    }

    /// The world-to-voxel matrix `M⁻¹`.
    pub fn inverse_matrix(&self) -> &Affine4 {
        &self.inverse
    }

    /// The inverse transform, mapping world to voxel coordinates.
    pub fn inverse(&self) -> AffineTransform {
        AffineTransform {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Apply the transform to a point, in the given direction.
    pub fn apply(&self, point: &Point3<f64>, direction: Direction) -> Point3<f64> {
        let m = match direction {
            Direction::VoxelToWorld => &self.forward,
            Direction::WorldToVoxel => &self.inverse,
        };
        let h = m * Vector4::new(point.x, point.y, point.z, 1.);
        Point3::new(h.x, h.y, h.z)
    }

    /// Map a voxel index to world coordinates.
    pub fn voxel_to_world(&self, voxel: &Point3<f64>) -> Point3<f64> {
        self.apply(voxel, Direction::VoxelToWorld)
    }

    /// Map world coordinates to a (continuous) voxel index.
    pub fn world_to_voxel(&self, world: &Point3<f64>) -> Point3<f64> {
        self.apply(world, Direction::WorldToVoxel)
    }

    /// The linear and translation components of `M`.
    pub fn linear_and_translation(&self) -> (Affine3, Vector3<f64>) {
        let linear = self.forward.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = Vector3::new(
            self.forward[(0, 3)],
            self.forward[(1, 3)],
            self.forward[(2, 3)],
        );
        (linear, translation)
    }

    /// World length of one voxel step along each voxel axis.
    pub fn spacing(&self) -> [f64; 3] {
        let (linear, _) = self.linear_and_translation();
        [
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        ]
    }

    /// Whether each voxel axis runs along (`1`) or against (`-1`) the
    /// matching world axis.
    pub fn axis_directions(&self) -> [i8; 3] {
        let mut out = [1; 3];
        for (axis, d) in out.iter_mut().enumerate() {
            if self.forward[(axis, axis)] < 0. {
                *d = -1;
            }
        }
        out
    }
}

/// Compute unit quaternion from last 3 values.
///
/// If w, x, y, z are the values in the full quaternion, assumes w is positive.
/// w = 0.0 corresponds to a 180 degree rotation.
/// `1.0 - (x*x + y*y + z*z)` can be slightly negative through rounding, in
/// which case w is taken as zero; beyond a small threshold this fails.
pub(crate) fn fill_positive(xyz: Vector3<f64>) -> Result<Quaternion<f64>> {
    let w2 = 1.0 - xyz.dot(&xyz);
    let w = if w2 < 0.0 {
        if w2 < QUATERNION_THRESHOLD {
            return Err(MosaicError::InvalidQuaternion(w2));
        }
        0.0
    } else {
        w2.sqrt()
    };
    Ok(Quaternion::new(w, xyz.x, xyz.y, xyz.z))
}

/// Calculate rotation matrix corresponding to quaternion.
///
/// Rotation matrix applies to column vectors, and is applied to the left of coordinate vectors.
/// The algorithm here allows non-unit quaternions.
///
/// Algorithm from https://en.wikipedia.org/wiki/Rotation_matrix#Quaternion
#[rustfmt::skip]
pub(crate) fn quaternion_to_affine(q: Quaternion<f64>) -> Affine3 {
    let nq = q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k;
    if nq < ::std::f64::EPSILON {
        return Affine3::identity();
    }
    let s = 2.0 / nq;
    let x = q.i * s;
    let y = q.j * s;
    let z = q.k * s;
    let wx = q.w * x;
    let wy = q.w * y;
    let wz = q.w * z;
    let xx = q.i * x;
    let xy = q.i * y;
    let xz = q.i * z;
    let yy = q.j * y;
    let yz = q.j * z;
    let zz = q.k * z;
    Affine3::new(
        1.0 - (yy + zz), xy - wz, xz + wy,
        xy + wz, 1.0 - (xx + zz), yz - wx,
        xz - wy, yz + wx, 1.0 - (xx + yy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quaternion_identity() {
        let q = fill_positive(Vector3::zeros()).unwrap();
        assert_eq!(q, Quaternion::new(1., 0., 0., 0.));
        assert_eq!(quaternion_to_affine(q), Affine3::identity());
    }

    #[test]
    #[rustfmt::skip]
    fn quaternion_half_turn() {
        // 180 degrees around y
        let q = fill_positive(Vector3::new(0., 1., 0.)).unwrap();
        assert_eq!(q.w, 0.);
        assert_relative_eq!(quaternion_to_affine(q), Affine3::new(
            -1., 0.,  0.,
             0., 1.,  0.,
             0., 0., -1.,
        ));
    }

    #[test]
    fn quaternion_out_of_range() {
        assert!(fill_positive(Vector3::new(1., 1., 0.)).is_err());
    }

    #[test]
    fn singular() {
        match AffineTransform::scale_only([1., 0., 1.]) {
            Err(MosaicError::SingularTransform(_)) => {}
            other => panic!("expected a singular transform, got {:?}", other),
        }
    }

    #[test]
    fn fine_spacing_is_not_singular() {
        // 50 µm voxels
        let t = AffineTransform::scale_only([5e-5; 3]).unwrap();
        let v = Point3::new(10., 20., 30.);
        let w = t.voxel_to_world(&v);
        assert_relative_eq!(w, Point3::new(5e-4, 1e-3, 1.5e-3), max_relative = 1e-12);
        assert_relative_eq!(t.world_to_voxel(&w), v, epsilon = 1e-9);
        assert_relative_eq!(t.spacing()[0], 5e-5, max_relative = 1e-12);
    }

    #[test]
    fn collinear_columns_are_singular() {
        let mut m = Affine4::identity();
        m[(0, 1)] = 1.;
        m[(1, 1)] = 0.;
        assert!(AffineTransform::new(m).is_err());
    }

    #[test]
    fn scale_only_round_trip() {
        let t = AffineTransform::scale_only([2., 3., 4.]).unwrap();
        let v = Point3::new(1., 2., 3.);
        let w = t.voxel_to_world(&v);
        assert_eq!(w, Point3::new(2., 6., 12.));
        assert_relative_eq!(t.world_to_voxel(&w), v);
        assert_eq!(t.spacing(), [2., 3., 4.]);
        assert_eq!(t.axis_directions(), [1, 1, 1]);
    }

    #[test]
    fn qfac_flips_third_axis() {
        let t = AffineTransform::from_rotation(Affine3::identity(), [1., 1., 2.], -1., [0.; 3])
            .unwrap();
        assert_eq!(t.matrix()[(2, 2)], -2.);
        assert_eq!(t.axis_directions(), [1, 1, -1]);
        assert_eq!(t.spacing(), [1., 1., 2.]);
    }
}
