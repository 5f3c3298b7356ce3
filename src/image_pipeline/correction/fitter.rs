use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::correction::types::ModelDescriptor;
use crate::image_pipeline::pixels::WorkingSize;
use crate::image_pipeline::stack::LoadedStack;

/// Knobs handed to the model optimizer, plus what the stack loader learned.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Max optimizer iterations
    pub max_iterations: usize,
    /// Max evaluations of the objective function
    pub max_function_evaluations: usize,
    pub progress_tolerance: f64,
    pub optimality_tolerance: f64,
    /// Number of L-BFGS corrections kept in memory
    pub lbfgs_corrections: usize,
    /// Canonical bit depth of the stack (8, 12 or 16 unless overridden)
    pub bit_depth: u32,
    /// Resolution the model must be returned at
    pub image_size: WorkingSize,
    /// Resolution of the planes handed to the fit
    pub working_size: WorkingSize,
}

impl FitOptions {
    pub fn new(bit_depth: u32, image_size: WorkingSize, working_size: WorkingSize) -> Self {
        Self {
            max_iterations: 500,
            max_function_evaluations: 1000,
            progress_tolerance: 1e-9,
            optimality_tolerance: 1e-5,
            lbfgs_corrections: 100,
            bit_depth,
            image_size,
            working_size,
        }
    }
}

/// Fits an illumination model to a working-size stack.
///
/// The optimizer lives outside this crate; implementations must return a
/// model at `options.image_size`.
pub trait ModelFitter {
    fn fit(&self, stack: &LoadedStack, options: &FitOptions) -> Result<ModelDescriptor>;
}
