use crate::dna::Genome;
use crate::error::ConfigError;
use crate::fitness::{channel_error, ColorSpace, FitnessMetric};
use crate::raster::Raster;
use crate::render::CpuRenderer;

/// the fitness problem: a target image prepared once at the evaluation resolution,
/// in the color space both sides are compared in.
#[derive(Clone, Debug)]
pub struct Problem {
    color_space: ColorSpace,
    metric: FitnessMetric,
    internal_resolution: u32,

    // native (display) size, also the genomes' canvas size
    width: u32,
    height: u32,

    eval_width: u32,
    eval_height: u32,
    target: Raster,            // flattened over white, native size
    target_channels: Vec<u8>,  // evaluation size, converted to color_space
}

impl Problem {
    pub fn new(
        color_space: ColorSpace,
        target: Raster,
        internal_resolution: u32,
        metric: FitnessMetric,
    ) -> Result<Self, ConfigError> {
        if internal_resolution == 0 {
            return Err(ConfigError::InternalResolution);
        }
        let (eval_width, eval_height) = target.evaluation_size(internal_resolution);
        let mut problem = Self {
            color_space,
            metric,
            internal_resolution,
            width: target.width(),
            height: target.height(),
            eval_width,
            eval_height,
            target: Raster::filled(1, 1, [255; 4]),
            target_channels: Vec::new(),
        };
        problem.install(target);
        Ok(problem)
    }

    /// swap in a new target of the same size. cached genome fitness is now stale
    /// and must be refreshed by the caller.
    pub fn replace_target(&mut self, target: Raster) -> Result<(), ConfigError> {
        if target.width() != self.width || target.height() != self.height {
            return Err(ConfigError::TargetDimensions {
                width: self.width,
                height: self.height,
                got_width: target.width(),
                got_height: target.height(),
            });
        }
        self.install(target);
        Ok(())
    }

    fn install(&mut self, target: Raster) {
        profiling::scope!("Problem::install");
        let flat = target.flatten_over_white();
        let small = flat.resized(self.eval_width, self.eval_height);
        self.target_channels = self.color_space.convert(small.data());
        self.target = flat;
    }

    /// render at the evaluation resolution and return the mean per-channel
    /// difference to the target. zero means a pixel-identical render.
    pub fn score(&self, genome: &Genome) -> f64 {
        profiling::scope!("Problem::score");
        CpuRenderer::with_scratch(genome, self.eval_width, self.eval_height, |rgba| {
            let current = self.color_space.convert(rgba);
            channel_error(&self.target_channels, &current, self.metric)
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn eval_size(&self) -> (u32, u32) {
        (self.eval_width, self.eval_height)
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn metric(&self) -> FitnessMetric {
        self.metric
    }

    pub fn internal_resolution(&self) -> u32 {
        self.internal_resolution
    }

    /// the target as renders are compared against it: native size, flattened over white
    pub fn target(&self) -> &Raster {
        &self.target
    }
}
