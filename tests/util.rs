use nifti_mosaic::{
    AffineTransform, AtlasSet, Dim3, InMemVolume, NiftiHeader, NiftiType, SamplerConfig,
    VolumeData, VolumeGeometry, VolumeSampler,
};

/// Value stored at voxel `(i, j, k)` of the ramp fixtures. Unique for every
/// voxel of the fixtures, and linear along each axis.
pub fn ramp_value(i: usize, j: usize, k: usize) -> f64 {
    (i + 10 * j + 100 * k) as f64
}

/// A single precision volume holding `ramp_value` at every voxel.
pub fn ramp_volume(dim: [usize; 3], spacing: [f64; 3]) -> InMemVolume {
    let dim = Dim3::new(dim).unwrap();
    let data = dim
        .index_iter()
        .map(|[i, j, k]| ramp_value(i, j, k) as f32)
        .collect();
    InMemVolume::new(dim, spacing, VolumeData::Float32(data)).unwrap()
}

/// A sampler over `ramp_volume`, packed with the given grid and an axis
/// aligned transform.
#[allow(dead_code)]
pub fn ramp_sampler(
    dim: [usize; 3],
    spacing: [f64; 3],
    slices_per_row: usize,
    slices_per_column: usize,
    config: SamplerConfig,
) -> VolumeSampler {
    let volume = ramp_volume(dim, spacing);
    let atlases = AtlasSet::pack(&volume, slices_per_row, slices_per_column).unwrap();
    let geometry = VolumeGeometry::new(
        Dim3::new(dim).unwrap(),
        AffineTransform::scale_only(spacing).unwrap(),
    );
    VolumeSampler::new(geometry, atlases, config).unwrap()
}

/// Header of an oblique scan, oriented by its quaternion with a negative
/// qfac.
#[allow(dead_code)]
pub fn qform_header() -> NiftiHeader {
    NiftiHeader {
        dim: [3, 8, 8, 6, 1, 1, 1, 1],
        datatype: NiftiType::Int16 as i16,
        bitpix: 16,
        pixdim: [-1.0, 0.9375, 0.9375, 3.0, 0.0, 0.0, 0.0, 0.0],
        qform_code: 1,
        sform_code: 0,
        quatern_b: 0.0,
        quatern_c: 1.0,
        quatern_d: 0.0,
        quatern_x: 59.557503,
        quatern_y: 73.172,
        quatern_z: 43.4291,
        ..NiftiHeader::default()
    }
}

/// Header of a scan with a raw sform affine.
#[allow(dead_code)]
pub fn sform_header() -> NiftiHeader {
    NiftiHeader {
        dim: [3, 8, 8, 6, 1, 1, 1, 1],
        datatype: NiftiType::Uint8 as i16,
        bitpix: 8,
        pixdim: [1.0, 2.5, 2.5, 2.5, 0.0, 0.0, 0.0, 0.0],
        qform_code: 0,
        sform_code: 1,
        srow_x: [2.4, -0.0008, -0.0411765, -114.766396],
        srow_y: [0.1, 2.4995277, 0.0485984, -97.420204],
        srow_z: [0.4, -0.0485, 2.4991884, -89.12282],
        ..NiftiHeader::default()
    }
}
