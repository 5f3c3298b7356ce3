use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use illumcorr_rs::image_pipeline::{read_model, CorrectionPipeline, PipelineConfig, TiffCompression};
use illumcorr_rs::logger;

use tracing::{error, info};

const USAGE: &str = "usage: illumcorr_rs <model.tiff|-> <output_dir> <input>...";

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting illumcorr...");

    let mut args = env::args().skip(1);
    let (Some(model_arg), Some(output_dir)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let inputs: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if inputs.is_empty() {
        bail!(USAGE);
    }

    let config = PipelineConfig::builder()
        .compression(TiffCompression::Lzw)
        .build();
    let mut pipeline = CorrectionPipeline::open(&inputs, config)
        .context("failed to open input stack")?;

    let shape = *pipeline.shape();
    info!(
        "Stack: {}x{}, {} channel(s), {} plane(s) per channel",
        shape.width,
        shape.height,
        shape.channel_count,
        pipeline.resolved().plane_count()
    );
    info!("Correction mode: {}", pipeline.config().correction_mode);

    let model = match model_arg.as_str() {
        "-" => None,
        path => Some(read_model(path).with_context(|| format!("failed to read model {}", path))?),
    };

    for channel in pipeline.channels() {
        let Some(model) = &model else {
            let loaded = pipeline.load_channel(channel)?;
            info!(
                channel,
                bit_depth = loaded.bit_depth,
                planes = loaded.stack.planes.len(),
                "Channel loaded"
            );
            continue;
        };

        let output = PathBuf::from(&output_dir).join(format!("corrected_c{}.tiff", channel));
        match pipeline.correct_channel_to_file(channel, model, &output) {
            Ok(count) => info!(channel, planes = count, "Wrote {}", output.display()),
            Err(e) => error!(channel, "Correction failed: {}", e),
        }
    }

    Ok(())
}
