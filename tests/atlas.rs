use nifti_mosaic::{
    AtlasImage, AtlasLayout, AtlasSet, Interpolation, MosaicError, SampleResult, SamplerConfig,
    VolumeGeometry, VolumeSampler,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

mod util;

use util::{ramp_value, ramp_volume};

#[test]
fn four_by_four_with_twenty_slices() {
    let layout = AtlasLayout::new(4, 4, 20).unwrap();
    assert_eq!(layout.atlas_capacity(), 16);
    assert_eq!(layout.num_atlases(), 2);

    let last_of_first = layout.slice_to_address(15).unwrap();
    assert_eq!(last_of_first.atlas, 0);
    assert_eq!((last_of_first.grid_row(), last_of_first.col), (3, 3));
    assert_eq!(last_of_first.row, 0);

    let first_of_second = layout.slice_to_address(16).unwrap();
    assert_eq!(first_of_second.atlas, 1);
    assert_eq!((first_of_second.grid_row(), first_of_second.col), (0, 0));
    assert_eq!(first_of_second.row, 3);

    match layout.slice_to_address(20) {
        Err(MosaicError::SliceIndexOutOfRange(20, 20)) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(layout.slice_to_address(-1).is_err());
}

#[test]
fn addressing_is_a_bijection() {
    for r in 1..6 {
        for c in 1..6 {
            for &n in &[1, 7, r * c, r * c + 1, 3 * r * c - 1] {
                let layout = AtlasLayout::new(r, c, n).unwrap();
                let addresses: HashSet<_> = (0..n as i64)
                    .map(|i| layout.slice_to_address(i).unwrap())
                    .map(|a| (a.atlas, a.row, a.col))
                    .collect();
                assert_eq!(addresses.len(), n, "grid {}x{} with {} slices", r, c, n);
                assert!(addresses.iter().all(|&(a, row, col)| {
                    a < layout.num_atlases() && row < c && col < r
                }));
            }
        }
    }
}

#[test]
fn tiles_do_not_overlap() {
    let (nx, ny) = (5, 3);
    let layout = AtlasLayout::new(3, 4, 12).unwrap();
    let (width, height) = (nx * 3, ny * 4);
    let mut covered = HashSet::new();
    for i in 0..12 {
        let address = layout.slice_to_address(i).unwrap();
        let rect = layout.pixel_region(&address).to_pixels(width, height);
        assert_eq!((rect.width, rect.height), (nx, ny));
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                assert!(covered.insert((x, y)), "pixel {:?} covered twice", (x, y));
            }
        }
    }
    assert_eq!(covered.len(), width * height);
}

#[test]
fn pack_then_fetch_every_voxel() {
    let volume = ramp_volume([5, 3, 20], [1.; 3]);
    let atlases = AtlasSet::pack(&volume, 4, 4).unwrap();
    assert_eq!(atlases.len(), 2);
    assert_eq!(atlases.channels(), 1);
    for image in atlases.images() {
        assert_eq!((image.width(), image.height()), (20, 12));
    }

    for k in 0..20 {
        let address = atlases.layout().slice_to_address(k as i64).unwrap();
        for j in 0..3 {
            for i in 0..5 {
                let texel = atlases
                    .fetch(&address, i as f64 / 5., j as f64 / 3.)
                    .unwrap();
                assert_eq!(texel.as_slice(), &[ramp_value(i, j, k)]);
            }
        }
    }
}

#[test]
fn external_atlases_sample_like_packed_ones() {
    let volume = ramp_volume([4, 4, 6], [1.; 3]);
    let packed = AtlasSet::pack(&volume, 2, 2).unwrap();

    // rebuild the set from plain pixel buffers, as decoded from images
    let images = packed
        .images()
        .iter()
        .map(|i| AtlasImage::new(i.width(), i.height(), i.channels(), i.texels().to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let external = AtlasSet::new(*packed.layout(), images).unwrap();
    assert_eq!(external, packed);

    let geometry = VolumeGeometry::from_header(&nifti_mosaic::NiftiHeader {
        dim: [3, 4, 4, 6, 1, 1, 1, 1],
        pixdim: [1., 1., 1., 1., 0., 0., 0., 0.],
        ..Default::default()
    })
    .unwrap();
    let config = SamplerConfig::default().with_edge_margin(0.);
    let sampler = VolumeSampler::new(geometry, external, config).unwrap();
    let p = sampler
        .geometry()
        .voxel_point([3, 1, 5], nifti_mosaic::SampleFrame::Centered);
    assert_eq!(
        sampler.sample_at(&p, Interpolation::Nearest).unwrap(),
        SampleResult::Value(nifti_mosaic::Texel::scalar(ramp_value(3, 1, 5)))
    );
}

#[test]
fn texture_limit_layout() {
    let layout = AtlasLayout::for_texture_limit(64, 64, 150, 1024).unwrap();
    assert_eq!((layout.slices_per_row(), layout.slices_per_column()), (16, 10));
    assert_eq!(layout.num_atlases(), 1);

    let layout = AtlasLayout::for_texture_limit(256, 256, 150, 1024).unwrap();
    assert_eq!((layout.slices_per_row(), layout.slices_per_column()), (4, 4));
    assert_eq!(layout.num_atlases(), 10);
}
