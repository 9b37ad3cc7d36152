use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polyga::{EngineConfig, GaEngine, History, Raster};

/// evolve a polygon approximation of an image
#[derive(Parser, Debug)]
#[command(name = "polyga", version, about, long_about = None)]
struct Cli {
    /// target image (png, jpeg or bmp)
    image: PathBuf,

    /// engine settings JSON; defaults are used when the file does not exist
    #[arg(short, long, default_value = "settings.json")]
    settings: PathBuf,

    /// number of generations to run
    #[arg(short, long, default_value_t = 1000)]
    generations: u64,

    /// output directory for target.png, best.png, history.json and best_genome.json
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// write best.png every N generations (0 = only at the end)
    #[arg(long, default_value_t = 100)]
    save_every: u64,

    /// override the rng seed from the settings file
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // configure Rayon's global thread pool once at startup so worker threads get nice names like "rayon-0".
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    let mut config = EngineConfig::load_or_default(&cli.settings)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let target: Raster = image::open(&cli.image)?.to_rgba8().into();
    tracing::info!("loaded {} ({}x{})", cli.image.display(), target.width(), target.height());

    std::fs::create_dir_all(&cli.out)?;
    let mut engine = GaEngine::new(target, config)?;
    // the target as renders are scored against it (flattened over white)
    save_png(engine.problem().target(), &cli.out.join("target.png"))?;
    let mut history = History::default();
    history.record(engine.stats());

    for _ in 0..cli.generations {
        profiling::scope!("generation");
        let step = engine.next();
        let generation = step.generation;
        let stats = engine.stats();
        let metrics = engine.best_metrics();
        tracing::info!(
            "gen {generation}: best {:.3} mean {:.3} psnr {:.2} dB{}",
            stats.best_fitness,
            stats.mean_fitness,
            metrics.psnr,
            stats.diversity.map(|d| format!(" diversity {d:.2}")).unwrap_or_default(),
        );
        history.record(stats);

        if cli.save_every > 0 && generation % cli.save_every == 0 {
            save_png(&engine.draw_best(), &cli.out.join("best.png"))?;
        }
        profiling::finish_frame!();
    }

    save_png(&engine.draw_best(), &cli.out.join("best.png"))?;
    history.save_json(cli.out.join("history.json"))?;
    std::fs::write(cli.out.join("best_genome.json"), serde_json::to_string_pretty(engine.best())?)?;
    tracing::info!("wrote results to {}", cli.out.display());
    Ok(())
}

fn save_png(raster: &Raster, path: &Path) -> Result<(), Box<dyn Error>> {
    profiling::scope!("save_png");
    let Some(img) = raster.to_image() else {
        return Err("render buffer does not match its dimensions".into());
    };
    img.save(path)?;
    Ok(())
}
