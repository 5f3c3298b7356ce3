use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::pixels::Plane;
use crate::image_pipeline::tiff::types::PipelineConfig;

pub trait PlaneSink {
    fn write_planes(&self, planes: &[Plane], output: &mut dyn Write, config: &PipelineConfig) -> Result<()>;
}
