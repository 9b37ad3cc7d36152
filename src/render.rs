use tiny_skia as sk;
use std::cell::RefCell;

use crate::dna::{Genome, Polygon};
use crate::geom::{bounds, outside_canvas};
use crate::raster::Raster;

// Scratch pixmap reused across scoring calls to avoid allocations.
// rayon workers each get their own.
thread_local! {
    static SCRATCH_PIX: RefCell<Option<sk::Pixmap>> = const { RefCell::new(None) };
}

pub struct CpuRenderer;

impl CpuRenderer {
    /// Render a genome onto an opaque white canvas of `width` x `height` pixels.
    /// Polygon coordinates live in the genome's canvas space and are scaled to fit.
    /// The background is opaque, so tiny-skia's premultiplied bytes are already straight RGBA.
    pub fn render(genome: &Genome, width: u32, height: u32) -> Raster {
        profiling::scope!("CpuRenderer::render");
        let Some(mut pix) = sk::Pixmap::new(width, height) else {
            return Raster::filled(width.max(1), height.max(1), [255; 4]);
        };
        paint_genome(&mut pix, genome);
        Raster::from_opaque_rgba(width, height, pix.take())
    }

    /// Render into the calling thread's scratch pixmap and hand its bytes to `f`.
    /// Used in the scoring hot path where the raster itself is never kept.
    pub fn with_scratch<T>(genome: &Genome, width: u32, height: u32, f: impl FnOnce(&[u8]) -> T) -> T {
        profiling::scope!("CpuRenderer::with_scratch");
        SCRATCH_PIX.with(|cell| {
            let mut slot = cell.borrow_mut();
            let reusable = matches!(slot.as_ref(), Some(pm) if pm.width() == width && pm.height() == height);
            if !reusable {
                *slot = sk::Pixmap::new(width, height);
            }
            match slot.as_mut() {
                Some(pix) => {
                    paint_genome(pix, genome);
                    f(pix.data())
                }
                // zero-sized canvas, nothing to paint
                None => f(&[]),
            }
        })
    }
}

fn paint_genome(pix: &mut sk::Pixmap, genome: &Genome) {
    pix.fill(sk::Color::WHITE);
    let sx = pix.width() as f32 / genome.width.max(1) as f32;
    let sy = pix.height() as f32 / genome.height.max(1) as f32;
    let transform = sk::Transform::from_scale(sx, sy);
    for poly in &genome.polys {
        draw_polygon(pix, poly, transform, genome.width as f32, genome.height as f32);
    }
}

fn draw_polygon(pix: &mut sk::Pixmap, poly: &Polygon, transform: sk::Transform, canvas_w: f32, canvas_h: f32) {
    profiling::scope!("draw_polygon");

    // quick reject in canvas space, before the path is even built
    let Some(b) = bounds(&poly.points) else {
        return;
    };
    if outside_canvas(b, canvas_w, canvas_h) {
        return;
    }

    let Some(path) = poly.path() else {
        return; // degenerate outline
    };
    let [r, g, b, a] = poly.rgba;
    let Some(color) = sk::Color::from_rgba(r, g, b, a) else {
        return;
    };

    let mut paint = sk::Paint::default();
    paint.anti_alias = true;
    paint.shader = sk::Shader::SolidColor(color);
    pix.fill_path(path, &paint, sk::FillRule::Winding, transform, None);
}
