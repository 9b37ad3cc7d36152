// fitness sharing: pairwise genome distances, niche counts and the ranking they induce

use rayon::prelude::*;

use crate::dna::Genome;

/// a pool sorted best-first, with the niching annotations that produced the order
#[derive(Debug)]
pub struct Ranking {
    pub population: Vec<Genome>,
    /// niche count per ranked genome (same order), None when niching is off
    pub niche_counts: Option<Vec<f64>>,
    /// sum of distances over unordered pairs of the whole pool, None when niching is off
    pub diversity: Option<f64>,
}

/// full symmetric distance matrix. rows are filled in parallel but each cell depends only
/// on its two genomes, so the result does not depend on the thread count.
pub fn distance_matrix(population: &[Genome]) -> Vec<Vec<f64>> {
    profiling::scope!("distance_matrix");
    let n = population.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| ((i + 1)..n).map(|j| population[i].dist(&population[j])).collect())
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in upper.iter().enumerate() {
        for (offset, &d) in row.iter().enumerate() {
            let j = i + 1 + offset;
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// half the sum of all matrix entries, i.e. every unordered pair once
pub fn diversity(matrix: &[Vec<f64>]) -> f64 {
    matrix.iter()
        .enumerate()
        .map(|(i, row)| row[i + 1..].iter().sum::<f64>())
        .sum()
}

/// sharing sum per individual: 1 for itself plus 1 - d/σ for every neighbour closer than σ
pub fn niche_counts(matrix: &[Vec<f64>], niche_size: f64) -> Vec<f64> {
    matrix.iter()
        .enumerate()
        .map(|(i, row)| {
            let crowding: f64 = row.iter()
                .enumerate()
                .filter(|&(j, &d)| j != i && d < niche_size)
                .map(|(_, &d)| 1.0 - d / niche_size)
                .sum();
            1.0 + crowding
        })
        .collect()
}

/// sort a pool best-first. with niching off this is a plain stable sort on raw fitness and no
/// distances are computed; otherwise the key is fitness × niche count.
pub fn rank(mut pool: Vec<Genome>, niche_size: f64) -> Ranking {
    profiling::scope!("niching::rank");
    if niche_size <= 0.0 {
        pool.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        return Ranking { population: pool, niche_counts: None, diversity: None };
    }

    let matrix = distance_matrix(&pool);
    let diversity = diversity(&matrix);
    let counts = niche_counts(&matrix, niche_size);

    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        let ka = pool[a].fitness * counts[a];
        let kb = pool[b].fitness * counts[b];
        ka.total_cmp(&kb)
    });

    let mut slots: Vec<Option<Genome>> = pool.into_iter().map(Some).collect();
    let population: Vec<Genome> = order.iter().filter_map(|&i| slots[i].take()).collect();
    let niche_counts = order.iter().map(|&i| counts[i]).collect();

    Ranking { population, niche_counts: Some(niche_counts), diversity: Some(diversity) }
}
