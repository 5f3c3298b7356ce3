use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};

use crate::image_pipeline::correction::CorrectionMode;
use crate::image_pipeline::pixels::Plane;
use crate::image_pipeline::stack::AxisSelection;
use crate::image_pipeline::tiff::{PipelineConfig, PlaneSink, TiffCompression, TiffPlaneSink};

#[test]
fn test_config_builder() {
    let config = PipelineConfig::builder()
        .target_num_pixels(20000)
        .use_min_image(true)
        .correction_mode(CorrectionMode::Direct)
        .bit_depth(Some(12))
        .selection(AxisSelection { series: vec![0], z: vec![], time: vec![1, 2] })
        .compression(TiffCompression::Lzw)
        .build();

    assert_eq!(config.target_num_pixels, 20000);
    assert!(config.use_min_image);
    assert!(!config.skip_preprocessing);
    assert_eq!(config.correction_mode, CorrectionMode::Direct);
    assert_eq!(config.bit_depth, Some(12));
    assert_eq!(config.selection.time, vec![1, 2]);
    assert_eq!(config.channels, None);
    assert_eq!(config.compression, TiffCompression::Lzw);
    assert!(!config.overwrite);
}

#[test]
fn test_config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.target_num_pixels, 9400);
    assert_eq!(config.correction_mode, CorrectionMode::ZeroLightPreserved);
    assert_eq!(config.bit_depth, None);
    assert_eq!(config.selection, AxisSelection::all());
}

#[test]
fn test_sink_writes_one_float_page_per_plane() {
    let planes = vec![
        Plane::from_rows(&[[1.5, 2.0, f64::INFINITY]]).unwrap(),
        Plane::from_rows(&[[-4.0, 0.0, 1e6]]).unwrap(),
    ];
    for compression in [TiffCompression::None, TiffCompression::Lzw, TiffCompression::Deflate] {
        let config = PipelineConfig::builder().compression(compression).build();
        let mut output = Cursor::new(Vec::new());
        TiffPlaneSink.write_planes(&planes, &mut output, &config).unwrap();

        let mut decoder = Decoder::new(Cursor::new(output.into_inner())).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 1));
        match decoder.read_image().unwrap() {
            DecodingResult::F32(values) => assert_eq!(values, vec![1.5, 2.0, f32::INFINITY]),
            _ => panic!("expected 32-bit float samples"),
        }
        assert!(decoder.more_images());
        decoder.next_image().unwrap();
        match decoder.read_image().unwrap() {
            DecodingResult::F32(values) => assert_eq!(values, vec![-4.0, 0.0, 1e6]),
            _ => panic!("expected 32-bit float samples"),
        }
        assert!(!decoder.more_images());
    }
}
