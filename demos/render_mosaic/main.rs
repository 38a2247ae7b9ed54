//! An application which packs a synthetic volume into atlases and renders
//! an axial plane through it as text.
//!
//! Usage: `render_mosaic [Z] [nearest|trilinear]`

use nifti_mosaic::{
    AtlasLayout, AtlasSet, InMemVolume, Interpolation, NiftiHeader, NiftiType, SamplePlane,
    SampleResult, SamplerConfig, SamplingDriver, VolumeData, VolumeGeometry, VolumeSampler,
};
use nalgebra::{Point3, Vector3};
use std::env;

const SHADES: &[u8] = b" .:-=+*#%@";

fn main() {
    let mut args = env::args().skip(1);
    let z: f64 = args
        .next()
        .map(|s| s.parse().expect("Z must be a number"))
        .unwrap_or(0.);
    let interpolation = match args.next().as_deref() {
        Some("nearest") => Interpolation::Nearest,
        None | Some("trilinear") => Interpolation::Trilinear,
        Some(other) => panic!("unknown interpolation `{}`", other),
    };

    // a 32×32×40 ball at 2 mm spacing
    let header = NiftiHeader {
        dim: [3, 32, 32, 40, 1, 1, 1, 1],
        datatype: NiftiType::Uint8 as i16,
        bitpix: 8,
        pixdim: [1., 2., 2., 2., 0., 0., 0., 0.],
        ..NiftiHeader::default()
    };
    let dim = header.dim3().expect("valid shape");
    let data = dim
        .index_iter()
        .map(|[i, j, k]| {
            let (x, y, z) = (i as f64 - 15.5, j as f64 - 15.5, k as f64 - 19.5);
            let r = (x * x + y * y + z * z).sqrt();
            (255. * (1. - r / 16.).max(0.)) as u8
        })
        .collect();
    let volume = InMemVolume::from_header(&header, VolumeData::Uint8(data))
        .expect("Failed to build volume");

    let layout = AtlasLayout::for_texture_limit(dim.nx(), dim.ny(), dim.nz(), 256)
        .expect("Failed to choose a layout");
    let atlases = AtlasSet::pack_with_layout(&volume, layout).expect("Failed to pack atlases");
    println!(
        "{} slices in {} atlas(es) of {}x{} tiles",
        layout.total_slices(),
        atlases.len(),
        layout.slices_per_row(),
        layout.slices_per_column()
    );

    let geometry = VolumeGeometry::from_header(&header).expect("Failed to derive geometry");
    let extents = geometry.extents();
    let sampler = VolumeSampler::new(geometry, atlases, SamplerConfig::default())
        .expect("Failed to build sampler");
    let driver = SamplingDriver::new(&sampler);

    // text cells are about twice as tall as they are wide
    let (width, height) = (72, 36);
    let step = (extents[0] + 4.) / width as f64;
    let plane = SamplePlane::new(
        Point3::new(-extents[0] / 2. - 2., -extents[1] / 2. - 2., z),
        Vector3::new(step, 0., 0.),
        Vector3::new(0., 2. * step, 0.),
        width,
        height,
    );
    let results = driver
        .sample_plane(&plane, interpolation)
        .expect("Failed to sample plane");

    for row in results.chunks(width).rev() {
        let line: String = row
            .iter()
            .map(|r| match r {
                SampleResult::Outside => ' ',
                SampleResult::Edge => '~',
                SampleResult::Value(t) => {
                    let v = (t.as_slice()[0] / 255.).max(0.).min(1.);
                    SHADES[(v * (SHADES.len() - 1) as f64).round() as usize] as char
                }
            })
            .collect();
        println!("{}", line);
    }
}
