// Engine module organization
// the generation step lives here, niching and reporting in their own submodules

pub mod metrics;
pub mod niching;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use rayon::prelude::*;

use crate::dna::{GeneId, Genome};
use crate::error::ConfigError;
use crate::problem::Problem;
use crate::raster::Raster;
use crate::settings::EngineConfig;

use self::niching::Ranking;

/// what one call to `GaEngine::next` hands back
#[derive(Debug)]
pub struct Generation<'a> {
    pub generation: u64,
    /// ranked best-first, exactly `pop_size` genomes
    pub population: &'a [Genome],
    /// half the sum of pairwise distances, None when niching is off
    pub diversity: Option<f64>,
}

pub struct GaEngine {
    rng: Pcg32,
    config: EngineConfig,
    problem: Problem,
    population: Vec<Genome>,   // ranked best-first
    niche_counts: Option<Vec<f64>>, // per ranked genome, recomputed every ranking
    generation: u64,
    next_gene_id: GeneId,
    diversity: Option<f64>,
}

impl GaEngine {
    /// validate the configuration, prepare the target and build a random initial population
    pub fn new(target: Raster, config: EngineConfig) -> Result<Self, ConfigError> {
        profiling::scope!("GaEngine::new");
        config.validate()?;
        let problem = Problem::new(config.color_space, target, config.internal_resolution, config.metric)?;
        let mut rng = Pcg32::seed_from_u64(config.seed);

        // ids and rng draws stay sequential, scoring fans out
        let mut next_id: GeneId = 0;
        let mut population = Vec::with_capacity(config.pop_size);
        for _ in 0..config.pop_size {
            let (genome, advanced) = Genome::random_unscored(
                problem.width(),
                problem.height(),
                &mut rng,
                next_id,
                config.n_poly,
                config.n_vertex,
                &config.mutation,
            );
            next_id = advanced;
            population.push(genome);
        }

        Ok(Self::assemble(rng, config, problem, population, next_id))
    }

    /// like `new`, but starts from caller-built genomes instead of random ones
    pub fn with_population(target: Raster, config: EngineConfig, population: Vec<Genome>) -> Result<Self, ConfigError> {
        profiling::scope!("GaEngine::with_population");
        config.validate()?;
        let problem = Problem::new(config.color_space, target, config.internal_resolution, config.metric)?;

        if population.len() != config.pop_size {
            return Err(ConfigError::SeedCount { expected: config.pop_size, got: population.len() });
        }
        for (index, genome) in population.iter().enumerate() {
            check_seed_shape(genome, &config, &problem).map_err(|reason| ConfigError::SeedGenome { index, reason })?;
        }

        let next_id = population.iter()
            .flat_map(|g| g.gene_ids())
            .max()
            .map_or(0, |id| id + 1);
        let rng = Pcg32::seed_from_u64(config.seed);
        Ok(Self::assemble(rng, config, problem, population, next_id))
    }

    fn assemble(rng: Pcg32, config: EngineConfig, problem: Problem, mut population: Vec<Genome>, next_gene_id: GeneId) -> Self {
        score_all(&mut population, &problem);
        for genome in &mut population {
            genome.birth = 0;
        }
        let Ranking { population, niche_counts, diversity } = niching::rank(population, config.niche_size);

        let (eval_w, eval_h) = problem.eval_size();
        tracing::info!(
            "engine ready: {}x{} target (evaluated at {}x{}, resolution {}), pop {}, {} polygons x {} vertices, {:?}, {:?}, {:?} crossover",
            problem.width(),
            problem.height(),
            eval_w,
            eval_h,
            problem.internal_resolution(),
            config.pop_size,
            config.n_poly,
            config.n_vertex,
            config.selection,
            config.replacement,
            config.crossover,
        );

        Self {
            rng,
            config,
            problem,
            population,
            niche_counts,
            generation: 0,
            next_gene_id,
            diversity,
        }
    }

    /// advance one full generation: select, recombine, mutate, score, rank and truncate.
    /// engine state is only committed once the new population is complete.
    pub fn next(&mut self) -> Generation<'_> {
        profiling::scope!("GaEngine::next");
        let generation = self.generation + 1;
        let pop_size = self.config.pop_size;

        // selecting + recombining + mutating
        let plan = self.config.selection.plan(&self.population);
        let mut next_id = self.next_gene_id;
        let mut offspring = Vec::with_capacity(pop_size);
        for _ in 0..pop_size {
            let (a, b) = plan.select_pair(&self.population, &mut self.rng);
            let mut child = Genome::recombine(
                &self.population[a],
                &self.population[b],
                self.config.crossover,
                &mut self.rng,
            );
            next_id = child.apply_mutations(&mut self.rng, next_id, &self.config.mutation).next_id;
            child.birth = generation;
            offspring.push(child);
        }
        score_all(&mut offspring, &self.problem);

        // evaluating diversity + truncating
        let pool = self.config.replacement.survivor_pool(&self.population, offspring);
        let Ranking { mut population, mut niche_counts, diversity } = niching::rank(pool, self.config.niche_size);
        population.truncate(pop_size);
        if let Some(counts) = niche_counts.as_mut() {
            counts.truncate(pop_size);
        }
        debug_assert_eq!(population.len(), pop_size, "population drifted from pop_size");

        self.population = population;
        self.niche_counts = niche_counts;
        self.diversity = diversity;
        self.next_gene_id = next_id;
        self.generation = generation;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let stats = self.stats();
            tracing::debug!(
                "gen {}: best {:.3} mean {:.3} worst {:.3} diversity {:?}",
                stats.generation,
                stats.best_fitness,
                stats.mean_fitness,
                stats.worst_fitness,
                stats.diversity,
            );
            if let Some(msp) = stats.mean_step_sizes {
                tracing::debug!("gen {}: mean step sizes {:?}", stats.generation, msp);
            }
        }

        Generation {
            generation: self.generation,
            population: &self.population,
            diversity: self.diversity,
        }
    }

    /// swap the target for one of identical dimensions. cached fitness goes stale
    /// until `rescore` is called.
    pub fn update_target(&mut self, target: Raster) -> Result<(), ConfigError> {
        self.problem.replace_target(target)?;
        tracing::info!("target replaced at generation {}", self.generation);
        Ok(())
    }

    /// re-evaluate the whole population against the current target and re-rank it
    pub fn rescore(&mut self) {
        profiling::scope!("GaEngine::rescore");
        let mut population = std::mem::take(&mut self.population);
        score_all(&mut population, &self.problem);
        let Ranking { population, niche_counts, diversity } = niching::rank(population, self.config.niche_size);
        self.population = population;
        self.niche_counts = niche_counts;
        self.diversity = diversity;
    }

    /// rank-0 genome
    pub fn best(&self) -> &Genome {
        &self.population[0]
    }

    /// full-resolution render of the rank-0 genome
    pub fn draw_best(&self) -> Raster {
        self.best().draw()
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn niche_counts(&self) -> Option<&[f64]> {
        self.niche_counts.as_deref()
    }

    pub fn diversity(&self) -> Option<f64> {
        self.diversity
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn next_gene_id(&self) -> GeneId {
        self.next_gene_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }
}

// every genome reads the same immutable problem, so the order of evaluation is irrelevant
fn score_all(population: &mut [Genome], problem: &Problem) {
    profiling::scope!("score_all");
    population.par_iter_mut().for_each(|g| g.evaluate(problem));
}

fn check_seed_shape(genome: &Genome, config: &EngineConfig, problem: &Problem) -> Result<(), String> {
    if genome.width != problem.width() || genome.height != problem.height() {
        return Err(format!(
            "canvas is {}x{}, target is {}x{}",
            genome.width,
            genome.height,
            problem.width(),
            problem.height()
        ));
    }
    if genome.n_poly() != config.n_poly {
        return Err(format!("{} polygons, expected {}", genome.n_poly(), config.n_poly));
    }
    if let Some(p) = genome.polys.iter().find(|p| p.points.len() != config.n_vertex) {
        return Err(format!("polygon {} has {} vertices, expected {}", p.id, p.points.len(), config.n_vertex));
    }
    if !genome.has_unique_ids() {
        return Err("duplicate gene ids".to_string());
    }
    Ok(())
}
