use rand::Rng;
use rand_distr::StandardNormal;
use std::collections::HashSet;
use std::sync::Arc;

use crate::dna::{GeneId, Genome, Polygon, ALPHA_MAX, ALPHA_MIN};
use crate::geom::clamp_point;
use crate::mutation_config::{learning_rates, MutationChannel, MutationConfig, STEP_MAX, STEP_MIN};
use crate::problem::Problem;

/// what one mutation pass did to a genome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// advanced gene-id counter
    pub next_id: GeneId,
    /// number of ids minted during the pass (replacements + de-duplication)
    pub minted: u64,
    /// true when anything that affects the render changed
    pub changed: bool,
}

#[inline]
fn gaussian<R: Rng>(rng: &mut R) -> f32 {
    rng.sample::<f32, _>(StandardNormal)
}

/// log-normal update of one polygon's step sizes:
/// σ' = σ · exp(τ'·g + τ·N(0,1)), with g shared across the whole genome
fn adapt_steps<R: Rng>(steps: [f32; 3], global: f32, tau_global: f32, tau_local: f32, rng: &mut R) -> [f32; 3] {
    steps.map(|s| (s * (tau_global * global + tau_local * gaussian(rng)).exp()).clamp(STEP_MIN, STEP_MAX))
}

// copy-on-write access that also drops the stale cached path
#[inline]
fn edit(slot: &mut Arc<Polygon>) -> &mut Polygon {
    let poly = Arc::make_mut(slot);
    poly.invalidate_path();
    poly
}

impl Genome {
    /// mutate in place and re-score if the render changed. returns the advanced gene-id counter.
    pub fn mutate<R: Rng>(
        &mut self,
        rng: &mut R,
        next_id: GeneId,
        cfg: &MutationConfig,
        problem: &Problem,
    ) -> GeneId {
        let outcome = self.apply_mutations(rng, next_id, cfg);
        if outcome.changed || !self.is_scored() {
            self.evaluate(problem);
        }
        outcome.next_id
    }

    /// the mutation pass without scoring, so callers can score many genomes at once.
    ///
    /// order of operations:
    /// 1. self-adaptive step update (when enabled), before the steps are used
    /// 2. vertex channel: each vertex jitters with probability rates[Vertex]
    /// 3. color channel: each of the four color components jitters with probability rates[Color]
    /// 4. topology channel: each slot is hit with probability rates[Topology]; a hit either
    ///    replaces the polygon with a fresh random one (new id) or moves it in the z-order
    /// 5. any id repeated inside the genome is re-minted so ids stay unique per genome
    pub fn apply_mutations<R: Rng>(
        &mut self,
        rng: &mut R,
        next_id: GeneId,
        cfg: &MutationConfig,
    ) -> MutationOutcome {
        profiling::scope!("Genome::apply_mutations");
        let mut next_id = next_id;
        let start_id = next_id;
        let mut changed = false;

        let n = self.polys.len();
        let w = self.width as f32;
        let h = self.height as f32;

        // 1. step sizes
        if cfg.self_adaptive && n > 0 {
            let (tau_global, tau_local) = learning_rates(3 * n);
            let global = gaussian(rng);
            for slot in &mut self.polys {
                let current = slot.msp.unwrap_or(cfg.step_sizes);
                Arc::make_mut(slot).msp = Some(adapt_steps(current, global, tau_global, tau_local, rng));
            }
        }

        let vertex_rate = cfg.rate(MutationChannel::Vertex);
        let color_rate = cfg.rate(MutationChannel::Color);
        for slot in &mut self.polys {
            let steps = slot.msp.unwrap_or(cfg.step_sizes);

            // 2. vertices
            for vi in 0..slot.points.len() {
                if rng.random::<f32>() < vertex_rate {
                    let (x, y) = slot.points[vi];
                    let sigma = steps[MutationChannel::Vertex.index()];
                    let moved = (x + gaussian(rng) * sigma * w, y + gaussian(rng) * sigma * h);
                    edit(slot).points[vi] = clamp_point(moved, w, h);
                    changed = true;
                }
            }

            // 3. color components (alpha keeps its own bounds)
            for ci in 0..4 {
                if rng.random::<f32>() < color_rate {
                    let sigma = steps[MutationChannel::Color.index()];
                    let (lo, hi) = if ci == 3 { (ALPHA_MIN, ALPHA_MAX) } else { (0.0, 1.0) };
                    let value = slot.rgba[ci] + gaussian(rng) * sigma;
                    edit(slot).rgba[ci] = value.clamp(lo, hi);
                    changed = true;
                }
            }
        }

        // 4. topology: replacements first so a freshly minted polygon is never overwritten,
        //    then z-order moves, which only shuffle existing polygons
        let topology_rate = cfg.rate(MutationChannel::Topology);
        let mut moves = Vec::new();
        for i in 0..n {
            if rng.random::<f32>() >= topology_rate {
                continue;
            }
            if rng.random_bool(0.5) {
                let old = &self.polys[i];
                let fresh = Polygon::random(rng, next_id, old.points.len(), self.width, self.height, old.msp);
                next_id += 1;
                self.polys[i] = Arc::new(fresh);
                changed = true;
            } else {
                moves.push(i);
            }
        }
        if n > 1 {
            for from in moves {
                let steps = self.polys[from].msp.unwrap_or(cfg.step_sizes);
                let sigma = steps[MutationChannel::Topology.index()];
                let mut shift = (gaussian(rng) * sigma * n as f32).round() as i64;
                if shift == 0 {
                    shift = if rng.random_bool(0.5) { 1 } else { -1 };
                }
                let to = (from as i64 + shift).clamp(0, n as i64 - 1) as usize;
                if to != from {
                    let poly = self.polys.remove(from);
                    self.polys.insert(to, poly);
                    changed = true;
                }
            }
        }

        // 5. crossover can bring two copies of one lineage together; give the later one a new id
        let mut seen = HashSet::with_capacity(n);
        for slot in &mut self.polys {
            if !seen.insert(slot.id) {
                Arc::make_mut(slot).id = next_id;
                seen.insert(next_id);
                next_id += 1;
            }
        }
        debug_assert!(self.has_unique_ids(), "duplicate gene ids after mutation");

        MutationOutcome { next_id, minted: next_id - start_id, changed }
    }
}
