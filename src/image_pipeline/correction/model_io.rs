//! Model persistence as a three page 64-bit float TIFF: gain, zero-light,
//! minimum image.

use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::correction::types::ModelDescriptor;
use crate::image_pipeline::pixels::Plane;

#[instrument(skip_all)]
pub fn write_model(model: &ModelDescriptor, output: &mut dyn Write) -> Result<()> {
    let size = model.image_size();
    debug!("Encoding model: {}x{}", size.width, size.height);

    let mut buffer = Vec::new();
    let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
        .map_err(|e| PipelineError::EncodeError(e.to_string()))?;

    for field in [&model.v, &model.z, &model.min_image] {
        encoder
            .write_image::<colortype::Gray64Float>(size.width as u32, size.height as u32, field.data())
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
    }
    drop(encoder);

    output.write_all(&buffer)?;
    Ok(())
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<ModelDescriptor> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let file = File::open(path)
        .map_err(|e| PipelineError::InputReadError(format!("{}: {}", name, e)))?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| PipelineError::DecodeError(format!("{}: {}", name, e)))?;

    let mut fields = Vec::with_capacity(3);
    loop {
        fields.push(read_field(&name, &mut decoder)?);
        if fields.len() == 3 || !decoder.more_images() {
            break;
        }
        decoder
            .next_image()
            .map_err(|e| PipelineError::DecodeError(format!("{}: {}", name, e)))?;
    }

    let mut fields = fields.into_iter();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(v), Some(z), Some(min_image)) => ModelDescriptor::new(v, z, min_image),
        _ => Err(PipelineError::DecodeError(format!(
            "{}: a model file needs gain, zero-light and minimum image pages",
            name
        ))),
    }
}

fn read_field(name: &str, decoder: &mut Decoder<BufReader<File>>) -> Result<Plane> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| PipelineError::DecodeError(format!("{}: {}", name, e)))?;
    let data = match decoder
        .read_image()
        .map_err(|e| PipelineError::DecodeError(format!("{}: {}", name, e)))?
    {
        DecodingResult::F64(values) => values,
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        _ => {
            return Err(PipelineError::DecodeError(format!(
                "{}: model pages must hold floating point samples",
                name
            )));
        }
    };
    Plane::new(width as usize, height as usize, data)
}
