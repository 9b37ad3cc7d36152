use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::geom::point_distance;
use crate::mutation_config::MutationConfig;
use crate::problem::Problem;
use crate::raster::Raster;
use crate::render::CpuRenderer;

/// lineage identifier minted from the run-wide counter. callers thread the counter
/// through every operation that can mint ids and get the advanced value back.
pub type GeneId = u64;

/// opacity range for freshly sampled polygons (20-200 in [0,255])
pub const ALPHA_MIN: f32 = 20.0 / 255.0;
pub const ALPHA_MAX: f32 = 200.0 / 255.0;

/// largest value `Polygon::distance` can return: 1.0 for geometry plus 1.0 for color
pub const MAX_POLYGON_DISTANCE: f64 = 2.0;

/// a polygon with a fixed vertex count and un-premultiplied color. also caches a T-S path
#[derive(Debug, Serialize, Deserialize)]
pub struct Polygon {
    pub id: GeneId,
    pub points: Vec<(f32, f32)>, // canvas pixel coordinates
    pub rgba: [f32; 4],          // un-premultiplied, 0..1

    /// self-adaptive step sizes (vertex, color, topology); None when self-adaptation is off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msp: Option<[f32; 3]>,

    #[serde(skip)]
    pub cached_path: OnceLock<Option<Arc<tiny_skia::Path>>>,
}

// this way stale paths won't be copied if the polygon is cloned.
impl Clone for Polygon {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            points: self.points.clone(),
            rgba: self.rgba,
            msp: self.msp,
            cached_path: OnceLock::new(),
        }
    }
}

// the path cache is derived data and never takes part in equality
impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.points == other.points
            && self.rgba == other.rgba
            && self.msp == other.msp
    }
}

impl Polygon {
    pub fn new(id: GeneId, points: Vec<(f32, f32)>, rgba: [f32; 4]) -> Self {
        Self { id, points, rgba, msp: None, cached_path: OnceLock::new() }
    }

    /// uniformly sampled vertices inside the canvas and a uniformly sampled color
    pub fn random<R: Rng>(
        rng: &mut R,
        id: GeneId,
        n_vertex: usize,
        width: u32,
        height: u32,
        msp: Option<[f32; 3]>,
    ) -> Self {
        profiling::scope!("Polygon::random");
        let w = width as f32;
        let h = height as f32;

        let points = (0..n_vertex)
            .map(|_| (rng.random::<f32>() * w, rng.random::<f32>() * h))
            .collect();
        let rgba = [
            rng.random::<f32>(),
            rng.random::<f32>(),
            rng.random::<f32>(),
            rng.random_range(ALPHA_MIN..=ALPHA_MAX),
        ];

        Self { id, points, rgba, msp, cached_path: OnceLock::new() }
    }

    /// tiny-skia path in canvas coordinates, built on first use.
    /// None for degenerate outlines tiny-skia refuses to build.
    pub fn path(&self) -> Option<&Arc<tiny_skia::Path>> {
        self.cached_path
            .get_or_init(|| {
                let (first, rest) = self.points.split_first()?;
                let mut pb = tiny_skia::PathBuilder::new();
                pb.move_to(first.0, first.1);
                for &(x, y) in rest {
                    pb.line_to(x, y);
                }
                pb.close();
                pb.finish().map(Arc::new)
            })
            .as_ref()
    }

    /// drop the cached path after editing points in place
    #[inline]
    pub fn invalidate_path(&mut self) {
        self.cached_path = OnceLock::new();
    }

    /// geometric + color difference in [0, MAX_POLYGON_DISTANCE].
    /// vertices are paired by index; `diagonal` normalizes pixel distances.
    pub fn distance(&self, other: &Polygon, diagonal: f32) -> f64 {
        let pairs = self.points.len().min(other.points.len());
        let geometry = if pairs == 0 {
            0.0
        } else {
            let sum: f64 = self.points.iter()
                .zip(&other.points)
                .map(|(&a, &b)| point_distance(a, b) as f64)
                .sum();
            (sum / pairs as f64 / diagonal.max(f32::EPSILON) as f64).min(1.0)
        };
        let color: f64 = self.rgba.iter()
            .zip(&other.rgba)
            .map(|(&a, &b)| (a - b).abs() as f64)
            .sum::<f64>() / 4.0;
        geometry + color
    }
}

/// a candidate solution: an ordered stack of polygons painted bottom to top.
// arc wrapper enables copy-on-write: cloning a genome or recombining parents only copies
// pointers, mutations use Arc::make_mut() to clone only the polygons they touch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Genome {
    pub width: u32,
    pub height: u32,

    #[serde(with = "arc_vec_serde")]
    pub polys: Vec<Arc<Polygon>>,

    /// cached dissimilarity to the problem target (lower is better).
    /// INFINITY until the genome has been evaluated.
    #[serde(skip, default = "unscored")]
    pub fitness: f64,

    /// generation that produced this genome (0 = initial population)
    #[serde(default)]
    pub birth: u64,
}

fn unscored() -> f64 {
    f64::INFINITY
}

impl PartialEq for Genome {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.polys == other.polys
    }
}

impl Genome {
    pub fn from_polygons(width: u32, height: u32, polys: Vec<Polygon>) -> Self {
        Self {
            width,
            height,
            polys: polys.into_iter().map(Arc::new).collect(),
            fitness: unscored(),
            birth: 0,
        }
    }

    /// random genome with `n_poly` polygons whose ids start at `start_id`.
    /// scores itself against the problem's current target and returns the advanced id counter.
    pub fn random<R: Rng>(
        problem: &Problem,
        rng: &mut R,
        start_id: GeneId,
        n_poly: usize,
        n_vertex: usize,
        mutation: &MutationConfig,
    ) -> (Genome, GeneId) {
        let (mut genome, next_id) =
            Self::random_unscored(problem.width(), problem.height(), rng, start_id, n_poly, n_vertex, mutation);
        genome.evaluate(problem);
        (genome, next_id)
    }

    pub(crate) fn random_unscored<R: Rng>(
        width: u32,
        height: u32,
        rng: &mut R,
        start_id: GeneId,
        n_poly: usize,
        n_vertex: usize,
        mutation: &MutationConfig,
    ) -> (Genome, GeneId) {
        profiling::scope!("Genome::random");
        let msp = mutation.initial_step_sizes();
        let polys = (0..n_poly)
            .map(|i| Polygon::random(rng, start_id + i as GeneId, n_vertex, width, height, msp))
            .collect();
        (Self::from_polygons(width, height, polys), start_id + n_poly as GeneId)
    }

    #[inline]
    pub fn n_poly(&self) -> usize {
        self.polys.len()
    }

    /// refresh the cached fitness against the problem's current target
    pub fn evaluate(&mut self, problem: &Problem) {
        self.fitness = problem.score(self);
    }

    #[inline]
    pub fn is_scored(&self) -> bool {
        self.fitness.is_finite()
    }

    /// full-resolution render for display or recording
    pub fn draw(&self) -> Raster {
        CpuRenderer::render(self, self.width, self.height)
    }

    /// symmetric, non-negative distance used for diversity measurement.
    /// polygons are compared slot by slot and the result is averaged over slots,
    /// slots missing from the shorter genome count as maximally distant.
    pub fn dist(&self, other: &Genome) -> f64 {
        profiling::scope!("Genome::dist");
        let slots = self.polys.len().max(other.polys.len());
        if slots == 0 {
            return 0.0;
        }
        let diagonal = ((self.width as f32).powi(2) + (self.height as f32).powi(2)).sqrt();
        let matched: f64 = self.polys.iter()
            .zip(&other.polys)
            .map(|(a, b)| a.distance(b, diagonal))
            .sum();
        let unmatched = self.polys.len().abs_diff(other.polys.len()) as f64 * MAX_POLYGON_DISTANCE;
        (matched + unmatched) / slots as f64
    }

    pub fn gene_ids(&self) -> impl Iterator<Item = GeneId> + '_ {
        self.polys.iter().map(|p| p.id)
    }

    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.polys.len());
        self.gene_ids().all(|id| seen.insert(id))
    }

    /// mean self-adaptive step sizes over all polygons, None when self-adaptation is off
    pub fn mean_step_sizes(&self) -> Option<[f32; 3]> {
        let mut sum = [0.0f32; 3];
        let mut count = 0usize;
        for msp in self.polys.iter().filter_map(|p| p.msp) {
            for (s, v) in sum.iter_mut().zip(msp) {
                *s += v;
            }
            count += 1;
        }
        (count > 0).then(|| sum.map(|s| s / count as f32))
    }
}

// serde helper module for (de)serializing Vec<Arc<T>> as a plain sequence of T
mod arc_vec_serde {
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{Serialize, SerializeSeq, Serializer};
    use std::sync::Arc;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, T>(vec: &Vec<Arc<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        let mut seq = serializer.serialize_seq(Some(vec.len()))?;
        for item in vec {
            seq.serialize_element(&**item)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<Arc<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().map(Arc::new).collect())
    }
}
