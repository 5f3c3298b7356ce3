use crate::image_pipeline::common::error::PipelineError;
use crate::image_pipeline::pixels::{encode_plane, PixelFormat, Plane, WorkingSize};
use crate::image_pipeline::source::{MemoryPlaneSource, PlaneIndex, PlaneSource, StackShape};
use crate::image_pipeline::stack::{
    estimate_bit_depth, plan_working_size, resolve_bit_depth, resolve_dimensions, AxisSelection,
    StackAccumulator, StackLoader,
};

fn shape(width: usize, height: usize, series: usize, z: usize, time: usize) -> StackShape {
    StackShape {
        width,
        height,
        series_count: series,
        channel_count: 1,
        time_count: time,
        z_count: z,
        pixel_format: PixelFormat::uint16(true),
        bits_per_sample: 16,
    }
}

fn boxed(source: MemoryPlaneSource) -> Box<dyn PlaneSource> {
    Box::new(source)
}

fn scenario_planes() -> Vec<Plane> {
    vec![
        Plane::from_rows(&[[10.0, 20.0], [30.0, 40.0]]).unwrap(),
        Plane::from_rows(&[[5.0, 25.0], [35.0, 15.0]]).unwrap(),
    ]
}

/// Source whose every plane is filled with `series * 100 + z * 10 + time`.
fn labelled_source(name: &str, series: usize, z: usize, time: usize) -> MemoryPlaneSource {
    let mut source = MemoryPlaneSource::new(name, shape(2, 2, series, z, time));
    for s in 0..series {
        for zi in 0..z {
            for t in 0..time {
                let label = (s * 100 + zi * 10 + t) as f64;
                let plane = Plane::filled(WorkingSize::new(2, 2), label);
                let bytes = encode_plane(&plane, PixelFormat::uint16(true)).unwrap();
                source.insert(PlaneIndex::new(s, zi, 0, t), bytes).unwrap();
            }
        }
    }
    source
}

#[test]
fn test_resolve_expands_empty_selection() {
    let sources = vec![boxed(labelled_source("a", 2, 3, 4))];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    assert_eq!(resolved.series, vec![0, 1]);
    assert_eq!(resolved.z, vec![0, 1, 2]);
    assert_eq!(resolved.time, vec![0, 1, 2, 3]);
    assert_eq!(resolved.plane_count(), 24);
}

#[test]
fn test_resolve_keeps_explicit_selection() {
    let sources = vec![
        boxed(labelled_source("a", 2, 3, 1)),
        boxed(labelled_source("b", 2, 3, 1)),
    ];
    let selection = AxisSelection { series: vec![1], z: vec![0, 2], time: vec![] };
    let resolved = resolve_dimensions(&sources, &selection).unwrap();

    assert_eq!(resolved.series, vec![1]);
    assert_eq!(resolved.z, vec![0, 2]);
    assert_eq!(resolved.planes_per_source(), 2);
    assert_eq!(resolved.plane_count(), 4);
}

#[test]
fn test_resolve_names_the_mismatching_field() {
    let sources = vec![
        boxed(MemoryPlaneSource::new("first", shape(4, 4, 1, 1, 1))),
        boxed(MemoryPlaneSource::new("second", shape(4, 5, 1, 1, 1))),
    ];
    match resolve_dimensions(&sources, &AxisSelection::all()) {
        Err(PipelineError::ShapeMismatch { file, field, expected, found }) => {
            assert_eq!(file, "second");
            assert_eq!(field, "Height");
            assert_eq!(expected, "4");
            assert_eq!(found, "5");
        }
        other => panic!("expected a shape mismatch, got {:?}", other.map(|r| r.shape)),
    }
}

#[test]
fn test_resolve_detects_pixel_format_mismatch() {
    let mut other = shape(4, 4, 1, 1, 1);
    other.pixel_format = PixelFormat::float32(true);
    let sources = vec![
        boxed(MemoryPlaneSource::new("first", shape(4, 4, 1, 1, 1))),
        boxed(MemoryPlaneSource::new("second", other)),
    ];
    let result = resolve_dimensions(&sources, &AxisSelection::all());
    assert!(matches!(
        result,
        Err(PipelineError::ShapeMismatch { field: "Pixel format", .. })
    ));
}

#[test]
fn test_resolve_rejects_under_populated_axis() {
    let sources = vec![boxed(labelled_source("short", 1, 2, 1))];
    let selection = AxisSelection { series: vec![], z: vec![0, 2], time: vec![] };
    let result = resolve_dimensions(&sources, &selection);
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientAxis { axis: "z sections", required: 2, available: 2, .. })
    ));
}

#[test]
fn test_resolve_rejects_empty_stacks() {
    let sources = vec![boxed(MemoryPlaneSource::new("empty", shape(2, 2, 1, 0, 1)))];
    let result = resolve_dimensions(&sources, &AxisSelection::all());
    assert!(matches!(result, Err(PipelineError::EmptyStack)));

    let result = resolve_dimensions(&[], &AxisSelection::all());
    assert!(matches!(result, Err(PipelineError::NoSources)));
}

#[test]
fn test_working_size_never_upsamples() {
    assert_eq!(plan_working_size(50, 40, 2000), WorkingSize::new(50, 40));
    assert_eq!(plan_working_size(50, 40, 1_000_000), WorkingSize::new(50, 40));
}

#[test]
fn test_working_size_preserves_aspect_ratio() {
    assert_eq!(plan_working_size(1000, 500, 9400), WorkingSize::new(137, 69));
    assert_eq!(plan_working_size(400, 400, 10000), WorkingSize::new(100, 100));
}

#[test]
fn test_working_size_at_exact_budget() {
    assert_eq!(plan_working_size(100, 94, 9400), WorkingSize::new(100, 94));
    assert_eq!(plan_working_size(94, 100, 9400), WorkingSize::new(94, 100));
}

#[test]
fn test_working_size_is_at_least_one_pixel() {
    assert_eq!(plan_working_size(10000, 1, 10), WorkingSize::new(316, 1));
    assert_eq!(plan_working_size(10, 10, 0), WorkingSize::new(1, 1));
}

#[test]
fn test_bit_depth_boundaries() {
    assert_eq!(estimate_bit_depth(4095.0, 16), 12);
    assert_eq!(estimate_bit_depth(4096.0, 16), 16);
    assert_eq!(estimate_bit_depth(255.0, 16), 8);
    assert_eq!(estimate_bit_depth(256.0, 16), 12);
    assert_eq!(estimate_bit_depth(60000.0, 8), 8);
    assert_eq!(estimate_bit_depth(0.0, 8), 8);
}

#[test]
fn test_explicit_bit_depth_wins() {
    assert_eq!(resolve_bit_depth(Some(14), 100.0, 16), 14);
    assert_eq!(resolve_bit_depth(None, 5000.0, 16), 16);
}

#[test]
fn test_two_plane_scenario() {
    let source = MemoryPlaneSource::from_planes("scenario", &scenario_planes(), PixelFormat::uint16(true)).unwrap();
    let mut sources = vec![boxed(source)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let loaded = StackLoader::new()
        .load(&mut sources, &resolved, 0, WorkingSize::new(2, 2))
        .unwrap();

    assert_eq!(loaded.min_image, Plane::from_rows(&[[5.0, 20.0], [30.0, 15.0]]).unwrap());
    assert_eq!(loaded.max_sample, 40.0);
    assert_eq!(loaded.planes, scenario_planes());
}

#[test]
fn test_min_image_stays_at_full_resolution() {
    let planes = vec![
        Plane::filled(WorkingSize::new(8, 4), 3.0),
        Plane::filled(WorkingSize::new(8, 4), 1.0),
    ];
    let source = MemoryPlaneSource::from_planes("big", &planes, PixelFormat::float64(true)).unwrap();
    let mut sources = vec![boxed(source)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let loaded = StackLoader::new()
        .load(&mut sources, &resolved, 0, WorkingSize::new(4, 2))
        .unwrap();

    assert!(loaded.planes.iter().all(|p| p.size() == WorkingSize::new(4, 2)));
    assert_eq!(loaded.min_image.size(), WorkingSize::new(8, 4));
    assert!(loaded.min_image.data().iter().all(|&v| v == 1.0));
    assert_eq!(loaded.max_sample, 3.0);
}

#[test]
fn test_enumeration_order_is_series_z_time() {
    let mut sources = vec![boxed(labelled_source("labels", 2, 2, 2))];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let loaded = StackLoader::new()
        .load(&mut sources, &resolved, 0, WorkingSize::new(1, 1))
        .unwrap();

    let labels: Vec<f64> = loaded.planes.iter().map(|p| p.get(0, 0)).collect();
    assert_eq!(labels, vec![0.0, 1.0, 10.0, 11.0, 100.0, 101.0, 110.0, 111.0]);
}

#[test]
fn test_min_image_spans_every_source() {
    let low = MemoryPlaneSource::from_planes("low", &[Plane::from_rows(&[[1.0, 9.0]]).unwrap()], PixelFormat::uint16(true)).unwrap();
    let high = MemoryPlaneSource::from_planes("high", &[Plane::from_rows(&[[7.0, 2.0]]).unwrap()], PixelFormat::uint16(true)).unwrap();
    let mut sources = vec![boxed(low), boxed(high)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let loaded = StackLoader::new()
        .load(&mut sources, &resolved, 0, WorkingSize::new(2, 1))
        .unwrap();

    assert_eq!(loaded.planes.len(), 2);
    assert_eq!(loaded.min_image.data(), &[1.0, 2.0]);
    assert_eq!(loaded.max_sample, 9.0);
}

#[test]
fn test_channel_out_of_range() {
    let source = MemoryPlaneSource::from_planes("scenario", &scenario_planes(), PixelFormat::uint16(true)).unwrap();
    let mut sources = vec![boxed(source)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let result = StackLoader::new().load(&mut sources, &resolved, 1, WorkingSize::new(2, 2));
    assert!(matches!(
        result,
        Err(PipelineError::ChannelOutOfRange { channel: 1, available: 1 })
    ));
}

#[test]
fn test_undecodable_plane_aborts_the_load() {
    let mut bad = shape(2, 2, 1, 1, 1);
    bad.pixel_format = PixelFormat {
        bytes_per_sample: 3,
        floating_point: false,
        little_endian: true,
        unsigned: true,
    };
    let mut source = MemoryPlaneSource::new("bad", bad);
    source.insert(PlaneIndex::new(0, 0, 0, 0), vec![0; 12]).unwrap();
    let mut sources = vec![boxed(source)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let result = StackLoader::new().load(&mut sources, &resolved, 0, WorkingSize::new(2, 2));
    assert!(matches!(
        result,
        Err(PipelineError::UnsupportedSampleFormat { bytes_per_sample: 3, .. })
    ));
}

#[test]
fn test_missing_plane_aborts_the_load() {
    let mut source = MemoryPlaneSource::new("sparse", shape(1, 1, 1, 2, 1));
    source
        .insert(PlaneIndex::new(0, 0, 0, 0), vec![1, 0])
        .unwrap();
    let mut sources = vec![boxed(source)];
    let resolved = resolve_dimensions(&sources, &AxisSelection::all()).unwrap();

    let result = StackLoader::new().load(&mut sources, &resolved, 0, WorkingSize::new(1, 1));
    assert!(matches!(result, Err(PipelineError::InputReadError(_))));
}

#[test]
fn test_min_image_is_order_independent() {
    let planes = vec![
        Plane::from_rows(&[[4.0, 8.0], [1.0, 6.0]]).unwrap(),
        Plane::from_rows(&[[3.0, 9.0], [2.0, 7.0]]).unwrap(),
        Plane::from_rows(&[[5.0, 0.5], [9.0, 6.5]]).unwrap(),
    ];
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    let results: Vec<(Plane, f64)> = orders
        .iter()
        .map(|order| {
            order
                .iter()
                .try_fold(StackAccumulator::new(), |acc, &i| acc.add(&planes[i]))
                .and_then(StackAccumulator::finish)
                .unwrap()
        })
        .collect();

    let expected = Plane::from_rows(&[[3.0, 0.5], [1.0, 6.0]]).unwrap();
    for (min_image, max_sample) in results {
        assert_eq!(min_image, expected);
        assert_eq!(max_sample, 9.0);
    }
}

#[test]
fn test_accumulators_combine_like_a_single_fold() {
    let a = Plane::from_rows(&[[4.0, 8.0]]).unwrap();
    let b = Plane::from_rows(&[[6.0, 2.0]]).unwrap();
    let c = Plane::from_rows(&[[5.0, 5.0]]).unwrap();

    let left = StackAccumulator::new().add(&a).unwrap();
    let right = StackAccumulator::new().add(&b).unwrap().add(&c).unwrap();
    let merged = right.combine(left).unwrap();
    assert_eq!(merged.planes(), 3);

    let (min_image, max_sample) = merged.combine(StackAccumulator::new()).unwrap().finish().unwrap();
    assert_eq!(min_image.data(), &[4.0, 2.0]);
    assert_eq!(max_sample, 8.0);

    assert!(matches!(StackAccumulator::new().finish(), Err(PipelineError::EmptyStack)));
}
