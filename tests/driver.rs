use nalgebra::{Point3, Vector3};
use nifti_mosaic::{
    Interpolation, SamplePlane, SampleQuery, SampleResult, SamplerConfig, SamplingDriver,
};
use pretty_assertions::assert_eq;

mod util;

use util::{ramp_sampler, ramp_value};

fn scattered_points(n: usize) -> Vec<Point3<f64>> {
    // deterministic spread over a box slightly larger than the volume
    (0..n)
        .map(|i| {
            let t = i as f64;
            Point3::new(
                ((t * 0.618_034) % 1.0) * 12. - 6.,
                ((t * 0.414_214) % 1.0) * 12. - 6.,
                ((t * 0.732_051) % 1.0) * 24. - 12.,
            )
        })
        .collect()
}

#[test]
fn parallel_matches_sequential() {
    let sampler = ramp_sampler([8, 8, 20], [1.25, 1.25, 1.0], 4, 4, SamplerConfig::default());
    let driver = SamplingDriver::new(&sampler);
    let points = scattered_points(2_000);

    for &mode in &[Interpolation::Nearest, Interpolation::Trilinear] {
        let parallel = driver.sample_points(&points, mode).unwrap();
        let sequential: Vec<_> = points
            .iter()
            .map(|p| sampler.sample_at(p, mode).unwrap())
            .collect();
        assert_eq!(parallel, sequential);
    }

    let queries: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mode = if i % 2 == 0 {
                Interpolation::Nearest
            } else {
                Interpolation::Trilinear
            };
            SampleQuery::new(*p, mode)
        })
        .collect();
    let parallel = driver.sample_queries(&queries).unwrap();
    for (q, r) in queries.iter().zip(parallel) {
        assert_eq!(driver.sample(q).unwrap(), r);
    }
}

#[test]
fn all_outcomes_are_reached() {
    let sampler = ramp_sampler([8, 8, 20], [1.25, 1.25, 1.0], 4, 4, SamplerConfig::default());
    let driver = SamplingDriver::new(&sampler);
    let results = driver
        .sample_points(&scattered_points(2_000), Interpolation::Trilinear)
        .unwrap();
    assert!(results.iter().any(|r| r.is_outside()));
    assert!(results.iter().any(|r| r.is_edge()));
    assert!(results.iter().any(|r| r.value().is_some()));
}

#[test]
fn axial_plane_through_a_slice() {
    let sampler = ramp_sampler([6, 4, 5], [1.; 3], 3, 2, SamplerConfig::default());
    let driver = SamplingDriver::new(&sampler);
    // voxel centres of slice 2 in the centred frame, plus one column past
    // each side of the box
    let plane = SamplePlane::axial(-3.5, -1.5, 0., 1., 8, 4);
    let results = driver.sample_plane(&plane, Interpolation::Nearest).unwrap();
    assert_eq!(results.len(), 32);
    for y in 0..4 {
        assert_eq!(results[y * 8], SampleResult::Outside);
        assert_eq!(results[y * 8 + 7], SampleResult::Outside);
        // centres of the outer voxels sit exactly on the inner side of the
        // edge band
        for x in 1..7 {
            let v = results[y * 8 + x].value().map(|t| t.as_slice()[0]);
            assert_eq!(v, Some(ramp_value(x - 1, y, 2)), "at {:?}", (x, y));
        }
    }
}

#[test]
fn render_colors() {
    let sampler = ramp_sampler([4, 4, 4], [1.; 3], 2, 2, SamplerConfig::default());
    let driver = SamplingDriver::new(&sampler);
    let plane = SamplePlane::new(
        Point3::new(-2.5, 0.2, 0.2),
        Vector3::new(0.6, 0., 0.),
        Vector3::new(0., 0., 0.),
        5,
        1,
    );
    let colors = driver.render_rgba(&plane, Interpolation::Nearest).unwrap();
    assert_eq!(colors.len(), 5);
    assert_eq!(colors[0].a, 0.);
    assert_eq!(colors[1], sampler.config().edge_color);
    // shifted X = 0.7, inside voxel (0, 2, 2)
    let v = ramp_value(0, 2, 2);
    assert_eq!(colors[2], rgb::RGBA::new(v, v, v, 1.));
}

#[cfg(feature = "ndarray_volumes")]
#[test]
fn plane_to_ndarray() {
    let sampler = ramp_sampler([4, 4, 4], [1.; 3], 2, 2, SamplerConfig::default());
    let driver = SamplingDriver::new(&sampler);
    let plane = SamplePlane::axial(-0.5, -0.5, 0.5, 1.2, 2, 3);
    let arr = driver
        .sample_plane_ndarray(&plane, Interpolation::Nearest)
        .unwrap();
    assert_eq!(arr.shape(), &[3, 2, 4]);
    let v = ramp_value(2, 1, 2);
    assert_eq!(arr[[0, 1, 0]], v);
    assert_eq!(arr[[0, 1, 3]], 1.);
    // the third row reaches the edge band
    assert_eq!(arr[[2, 0, 2]], sampler.config().edge_color.b);
}
