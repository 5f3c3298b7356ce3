use tracing::info;

/// Classifies the effective dynamic range of a channel as 8, 12 or 16 bits.
///
/// Uses the observed maximum, so a container declaring 16 bits whose samples
/// never exceed 4095 is reported as 12-bit.
pub fn estimate_bit_depth(max_sample: f64, source_bits: u32) -> u32 {
    if source_bits > 8 && max_sample > 4095.0 {
        16
    } else if source_bits > 8 && max_sample > 255.0 {
        12
    } else {
        8
    }
}

/// Bit depth to hand to the model fit: the explicit override when present,
/// the estimate otherwise.
pub fn resolve_bit_depth(explicit: Option<u32>, max_sample: f64, source_bits: u32) -> u32 {
    match explicit {
        Some(bits) => {
            info!("{}-bit depth images (provided)", bits);
            bits
        }
        None => {
            let bits = estimate_bit_depth(max_sample, source_bits);
            info!(
                "{}-bit depth images (estimated from max intensity={})",
                bits, max_sample
            );
            bits
        }
    }
}
