use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use crate::dna::{GeneId, Genome, Polygon};
use crate::error::ConfigError;
use crate::problem::Problem;

/// how a child's polygon slots are drawn from its two parents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    /// every slot independently from either parent with probability ½
    #[default]
    Uniform,
    /// slots [0, cut) from the first parent, [cut, n) from the second
    OnePoint,
    /// polygons sharing a gene id are paired regardless of position; the rest fall back to uniform
    Aligned,
}

impl FromStr for CrossoverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(CrossoverKind::Uniform),
            "one_point" | "onepoint" | "single_point" => Ok(CrossoverKind::OnePoint),
            "aligned" => Ok(CrossoverKind::Aligned),
            _ => Err(ConfigError::UnknownCrossover(s.to_string())),
        }
    }
}

impl Genome {
    /// child genome of the same polygon count, scored against the problem.
    /// fitness is never inherited.
    pub fn crossover<R: Rng>(
        parent1: &Genome,
        parent2: &Genome,
        kind: CrossoverKind,
        problem: &Problem,
        rng: &mut R,
    ) -> Genome {
        let mut child = Self::recombine(parent1, parent2, kind, rng);
        child.evaluate(problem);
        child
    }

    /// assemble a child without scoring it. polygons are shared with the parents
    /// (Arc clones) until a mutation touches them.
    pub fn recombine<R: Rng>(parent1: &Genome, parent2: &Genome, kind: CrossoverKind, rng: &mut R) -> Genome {
        profiling::scope!("Genome::recombine");
        let polys = match kind {
            CrossoverKind::Uniform => uniform(parent1, parent2, rng),
            CrossoverKind::OnePoint => one_point(parent1, parent2, rng),
            CrossoverKind::Aligned => aligned(parent1, parent2, rng),
        };
        Genome {
            width: parent1.width,
            height: parent1.height,
            polys,
            fitness: f64::INFINITY,
            birth: 0,
        }
    }
}

fn uniform<R: Rng>(p1: &Genome, p2: &Genome, rng: &mut R) -> Vec<Arc<Polygon>> {
    p1.polys.iter()
        .enumerate()
        .map(|(slot, a)| match p2.polys.get(slot) {
            Some(b) if rng.random_bool(0.5) => Arc::clone(b),
            _ => Arc::clone(a),
        })
        .collect()
}

fn one_point<R: Rng>(p1: &Genome, p2: &Genome, rng: &mut R) -> Vec<Arc<Polygon>> {
    let n = p1.polys.len();
    if n < 2 {
        return p1.polys.clone();
    }
    let cut = rng.random_range(1..n);
    p1.polys.iter()
        .enumerate()
        .map(|(slot, a)| match p2.polys.get(slot) {
            Some(b) if slot >= cut => Arc::clone(b),
            _ => Arc::clone(a),
        })
        .collect()
}

/// walk the first parent's slots. a polygon whose id also lives somewhere in the second
/// parent is paired with that copy and one of the two is kept at this slot. otherwise the
/// second parent's polygon at the same slot competes, but only if its own lineage is
/// absent from the first parent (so it cannot show up twice in the child).
fn aligned<R: Rng>(p1: &Genome, p2: &Genome, rng: &mut R) -> Vec<Arc<Polygon>> {
    let by_id: HashMap<GeneId, &Arc<Polygon>> = p2.polys.iter().map(|p| (p.id, p)).collect();
    let p1_ids: HashSet<GeneId> = p1.gene_ids().collect();

    p1.polys.iter()
        .enumerate()
        .map(|(slot, a)| {
            if let Some(b) = by_id.get(&a.id) {
                return if rng.random_bool(0.5) { Arc::clone(b) } else { Arc::clone(a) };
            }
            match p2.polys.get(slot) {
                Some(b) if !p1_ids.contains(&b.id) && rng.random_bool(0.5) => Arc::clone(b),
                _ => Arc::clone(a),
            }
        })
        .collect()
}
