#![no_main]
use libfuzzer_sys::fuzz_target;
use nalgebra::Point3;
use nifti_mosaic::{
    AffineTransform, AtlasSet, Dim3, InMemVolume, Interpolation, SamplerConfig, VolumeData,
    VolumeGeometry, VolumeSampler,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let nx = 1 + (data[0] % 7) as usize;
    let ny = 1 + (data[1] % 7) as usize;
    let nz = 1 + (data[2] % 23) as usize;
    let per_row = 1 + (data[3] % 4) as usize;
    let dim = Dim3::new([nx, ny, nz]).unwrap();
    let values = (0..dim.element_count()).map(|v| v as u8).collect();
    let volume = InMemVolume::new(dim, [1.; 3], VolumeData::Uint8(values)).unwrap();
    let atlases = AtlasSet::pack(&volume, per_row, per_row).unwrap();
    let transform = AffineTransform::scale_only([1.; 3]).unwrap();
    let sampler = VolumeSampler::new(
        VolumeGeometry::new(dim, transform),
        atlases,
        SamplerConfig::default().with_edge_margin(0.),
    )
    .unwrap();

    for chunk in data[4..].chunks_exact(12) {
        let coord = |c: &[u8]| f64::from(i32::from_le_bytes([c[0], c[1], c[2], c[3]])) / 1e6;
        let p = Point3::new(coord(&chunk[0..4]), coord(&chunk[4..8]), coord(&chunk[8..12]));
        for &mode in &[Interpolation::Nearest, Interpolation::Trilinear] {
            // a packed set always holds every atlas, so sampling never fails
            sampler.sample_at(&p, mode).unwrap();
        }
    }
});
