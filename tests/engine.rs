use std::collections::HashSet;

use polyga::engine::niching;
use polyga::{
    ConfigError, CrossoverKind, EngineConfig, GaEngine, Genome, MutationConfig, Polygon, Raster,
    ReplacementStrategy, SelectionStrategy,
};

fn gradient(width: u32, height: u32) -> Raster {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            data.extend_from_slice(&[r, g, 200, 255]);
        }
    }
    Raster::new(width, height, data).unwrap()
}

fn tiny_config() -> EngineConfig {
    EngineConfig {
        pop_size: 6,
        n_poly: 3,
        n_vertex: 3,
        internal_resolution: 12,
        ..Default::default()
    }
}

#[test]
fn population_size_is_kept_for_every_policy() {
    let selections = [
        SelectionStrategy::RouletteWheel,
        SelectionStrategy::RankBased,
        SelectionStrategy::TruncatedRank { cutoff: 0.3 },
        SelectionStrategy::Tournament { k: 2 },
    ];
    let replacements = [ReplacementStrategy::Comma, ReplacementStrategy::Plus];
    let crossovers = [CrossoverKind::Uniform, CrossoverKind::OnePoint, CrossoverKind::Aligned];

    for selection in selections {
        for replacement in replacements {
            for crossover in crossovers {
                for niche_size in [0.0, 0.4] {
                    let cfg = EngineConfig { selection, replacement, crossover, niche_size, ..tiny_config() };
                    let mut engine = GaEngine::new(gradient(12, 8), cfg).unwrap();
                    for _ in 0..2 {
                        let step = engine.next();
                        assert_eq!(step.population.len(), 6, "{selection:?} {replacement:?} {crossover:?}");
                        assert_eq!(step.diversity.is_some(), niche_size > 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn comma_keeps_offspring_only() {
    let mut engine = GaEngine::new(gradient(12, 8), tiny_config()).unwrap();
    for expected in 1..=3 {
        let step = engine.next();
        assert_eq!(step.generation, expected);
        assert!(step.population.iter().all(|g| g.birth == expected));
    }
}

#[test]
fn plus_never_loses_the_best() {
    let cfg = EngineConfig {
        replacement: ReplacementStrategy::Plus,
        mutation: MutationConfig { rates: [0.2, 0.2, 0.1], ..Default::default() },
        ..tiny_config()
    };
    let mut engine = GaEngine::new(gradient(12, 8), cfg).unwrap();
    let mut best = engine.best().fitness;
    for _ in 0..10 {
        let step = engine.next();
        let now = step.population[0].fitness;
        assert!(now <= best);
        best = now;
    }
}

#[test]
fn ranking_follows_raw_fitness_without_niching() {
    let mut engine = GaEngine::new(gradient(12, 8), tiny_config()).unwrap();
    for _ in 0..3 {
        let step = engine.next();
        assert!(step.population.windows(2).all(|w| w[0].fitness <= w[1].fitness));
    }
    assert!(engine.niche_counts().is_none());
}

fn square_genome(id: u64, x: f32, fitness: f64) -> Genome {
    let poly = Polygon::new(id, vec![(x, 0.0), (x + 10.0, 0.0), (x + 10.0, 10.0)], [0.2, 0.4, 0.6, 0.5]);
    let mut g = Genome::from_polygons(100, 100, vec![poly]);
    g.fitness = fitness;
    g
}

#[test]
fn niching_reorders_crowded_individuals() {
    let pool = vec![
        square_genome(0, 0.0, 1.0),
        square_genome(1, 0.2, 1.05),
        square_genome(2, 0.4, 1.1),
        square_genome(3, 90.0, 1.3),
    ];
    let raw = niching::rank(pool.clone(), 0.0);
    let shared = niching::rank(pool, 0.5);

    let raw_ids: Vec<u64> = raw.population.iter().map(|g| g.polys[0].id).collect();
    let shared_ids: Vec<u64> = shared.population.iter().map(|g| g.polys[0].id).collect();
    assert_eq!(raw_ids, vec![0, 1, 2, 3]);
    assert_ne!(raw_ids, shared_ids);
    // the isolated genome escapes the crowd penalty
    assert_eq!(shared_ids[0], 3);
}

#[test]
fn gene_ids_are_never_reissued() {
    // comma replacement with pop_size offspring keeps every child, so each id minted in a
    // generation must still be present, in exactly one genome
    let cfg = EngineConfig {
        mutation: MutationConfig { rates: [0.1, 0.1, 0.5], ..Default::default() },
        crossover: CrossoverKind::Aligned,
        replacement: ReplacementStrategy::Comma,
        ..tiny_config()
    };
    let mut engine = GaEngine::new(gradient(12, 8), cfg).unwrap();

    let mut issued: Vec<u64> = engine.population().iter().flat_map(|g| g.gene_ids()).collect();
    assert_eq!(issued.len() as u64, engine.next_gene_id());

    for _ in 0..15 {
        let before = engine.next_gene_id();
        engine.next();
        let after = engine.next_gene_id();
        assert!(after >= before);

        let mut fresh: Vec<u64> = Vec::new();
        for genome in engine.population() {
            assert!(genome.has_unique_ids());
            for id in genome.gene_ids() {
                assert!(id < after, "id {id} beyond the counter {after}");
                if id >= before {
                    fresh.push(id);
                }
            }
        }
        fresh.sort_unstable();
        let minted: Vec<u64> = (before..after).collect();
        assert_eq!(fresh, minted, "generation minted ids [{before}, {after}) but the offspring hold {fresh:?}");
        issued.extend(fresh);
    }

    let distinct: HashSet<u64> = issued.iter().copied().collect();
    assert_eq!(distinct.len(), issued.len(), "an id was issued twice");
    assert_eq!(issued.len() as u64, engine.next_gene_id());
    assert!(engine.next_gene_id() > 18);
}

fn fixed_population() -> Vec<Genome> {
    // four genomes, two triangles each, every gene id distinct
    (0..4u64)
        .map(|i| {
            let shade = i as f32 / 4.0;
            let offset = i as f32 * 2.0;
            let polys = vec![
                Polygon::new(2 * i, vec![(offset, 0.0), (16.0, offset), (0.0, 16.0)], [shade, 0.2, 0.8, 0.5]),
                Polygon::new(2 * i + 1, vec![(16.0, 16.0), (offset, 16.0), (16.0, 0.0)], [0.9, shade, 0.1, 0.4]),
            ];
            Genome::from_polygons(16, 16, polys)
        })
        .collect()
}

#[test]
fn uniform_crossover_without_mutation_recombines_the_top_parents() {
    let cfg = EngineConfig {
        pop_size: 4,
        n_poly: 2,
        n_vertex: 3,
        selection: SelectionStrategy::TruncatedRank { cutoff: 0.5 },
        replacement: ReplacementStrategy::Comma,
        crossover: CrossoverKind::Uniform,
        niche_size: 0.0,
        mutation: MutationConfig { rates: [0.0, 0.0, 0.0], ..Default::default() },
        internal_resolution: 16,
        ..Default::default()
    };
    let mut engine = GaEngine::with_population(gradient(16, 16), cfg, fixed_population()).unwrap();
    // truncated rank at 0.5 of 4 keeps exactly the two best as parents
    let parents: Vec<Genome> = engine.population()[..2].to_vec();
    let next_id = engine.next_gene_id();

    let step = engine.next();
    assert_eq!(step.generation, 1);
    assert!(step.diversity.is_none());
    assert_eq!(step.population.len(), 4);
    for child in step.population {
        for (slot, poly) in child.polys.iter().enumerate() {
            assert!(
                **poly == *parents[0].polys[slot] || **poly == *parents[1].polys[slot],
                "slot {slot} did not come from a selected parent"
            );
        }
    }
    // nothing was mutated, so nothing was minted
    assert_eq!(engine.next_gene_id(), next_id);
}

#[test]
fn tournament_of_one_in_a_pair_takes_both() {
    let cfg = EngineConfig {
        pop_size: 2,
        selection: SelectionStrategy::Tournament { k: 1 },
        ..tiny_config()
    };
    let mut engine = GaEngine::new(gradient(12, 8), cfg).unwrap();
    let plan = engine.config().selection.plan(engine.population());
    assert!(plan.probabilities().is_none());

    let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(7);
    for _ in 0..10 {
        let (a, b) = plan.select_pair(engine.population(), &mut rng);
        let mut pair = [a, b];
        pair.sort();
        assert_eq!(pair, [0, 1]);
    }
    assert_eq!(engine.next().population.len(), 2);
}

#[test]
fn configuration_errors_fail_fast() {
    let target = gradient(8, 8);
    let bad = [
        (EngineConfig { pop_size: 0, ..tiny_config() }, ConfigError::PopulationSize(0)),
        (EngineConfig { n_vertex: 2, ..tiny_config() }, ConfigError::VertexCount(2)),
        (EngineConfig { niche_size: -0.5, ..tiny_config() }, ConfigError::NicheSize(-0.5)),
        (
            EngineConfig { selection: SelectionStrategy::TruncatedRank { cutoff: 1.5 }, ..tiny_config() },
            ConfigError::Cutoff(1.5),
        ),
    ];
    for (cfg, expected) in bad {
        assert_eq!(GaEngine::new(target.clone(), cfg).err(), Some(expected));
    }

    assert!(matches!("lottery".parse::<SelectionStrategy>(), Err(ConfigError::UnknownSelection(_))));
    assert!(matches!("elitist".parse::<ReplacementStrategy>(), Err(ConfigError::UnknownReplacement(_))));
    assert!(matches!("two_point".parse::<CrossoverKind>(), Err(ConfigError::UnknownCrossover(_))));
}

#[test]
fn genome_distance_is_a_symmetric_premetric() {
    let engine = GaEngine::new(gradient(12, 8), tiny_config()).unwrap();
    let pop = engine.population();
    for a in pop {
        assert_eq!(a.dist(a), 0.0);
        for b in pop {
            assert_eq!(a.dist(b), b.dist(a));
            assert!(a.dist(b) >= 0.0);
        }
    }
}

#[test]
fn best_render_is_full_resolution() {
    let mut engine = GaEngine::new(gradient(30, 20), EngineConfig { internal_resolution: 10, ..tiny_config() }).unwrap();
    engine.next();
    let img = engine.draw_best();
    assert_eq!((img.width(), img.height()), (30, 20));
    assert_eq!(engine.problem().eval_size(), (10, 7));
    assert_eq!(engine.problem().internal_resolution(), 10);
}

#[test]
fn scoring_target_is_native_size_over_white() {
    let translucent = Raster::filled(9, 5, [0, 0, 0, 0]);
    let engine = GaEngine::new(translucent, tiny_config()).unwrap();
    let target = engine.problem().target();
    assert_eq!((target.width(), target.height()), (9, 5));
    assert!(target.data().iter().all(|&c| c == 255));
}
