use std::{fs::File, io::BufWriter, path::PathBuf, time::Instant};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::info;

use scanray::{PathTracer, PngSink, PpmSink, RenderConfig, RowSink, Scene, Strategy};

#[derive(Parser, Debug)]
#[command(name = "scanray", version, about = "Scanline-parallel CPU raytracer")]
struct Cli {
    /// JSON render config; CLI flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Number of rays to cast for each pixel.
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum child rays per camera ray.
    #[arg(long)]
    depth: Option<u32>,

    /// Worker pool size, fixed for the whole render.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Work-distribution strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyChoice>,

    /// Built-in scene to render.
    #[arg(long)]
    scene: Option<String>,

    /// Seed for all stochastic sampling (output is reproducible per seed).
    #[arg(long)]
    seed: Option<u64>,

    /// Output path; `.png` selects PNG, anything else plain-text PPM.
    /// Writes PPM to stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    BarrierRounds,
    StaticPartition,
    PollingPool,
}

impl From<StrategyChoice> for Strategy {
    fn from(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::BarrierRounds => Strategy::BarrierRounds,
            StrategyChoice::StaticPartition => Strategy::StaticPartition,
            StrategyChoice::PollingPool => Strategy::PollingPool,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => RenderConfig::default(),
    };
    apply_overrides(&mut cfg, &cli);

    let frame = cfg.frame()?;
    let scene = Scene::by_name(&cfg.scene, cfg.seed)?;
    let shader = PathTracer::new(&scene, cfg.seed);

    info!(
        width = frame.width,
        height = frame.height,
        samples = frame.samples_per_pixel,
        workers = cfg.workers,
        strategy = ?cfg.strategy,
        scene = %cfg.scene,
        "starting render"
    );
    let started = Instant::now();

    let mut sink: Box<dyn RowSink> = match &cli.out {
        None => {
            let stdout = BufWriter::new(std::io::stdout());
            Box::new(PpmSink::new(stdout, &frame)?)
        }
        Some(path) if path.extension().is_some_and(|e| e == "png") => {
            Box::new(PngSink::new(path, &frame))
        }
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file '{}'", path.display()))?;
            Box::new(PpmSink::new(BufWriter::new(file), &frame)?)
        }
    };

    let stats = scanray::render(&frame, &shader, sink.as_mut(), cfg.workers, cfg.strategy)?;
    sink.finish()?;

    info!(
        rows = stats.rows_rendered,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

fn apply_overrides(cfg: &mut RenderConfig, cli: &Cli) {
    if let Some(width) = cli.width {
        cfg.width = width;
    }
    if let Some(height) = cli.height {
        cfg.height = height;
    }
    if let Some(samples) = cli.samples {
        cfg.samples_per_pixel = samples;
    }
    if let Some(depth) = cli.depth {
        cfg.child_ray_budget = depth;
    }
    if let Some(workers) = cli.workers {
        cfg.workers = workers;
    }
    if let Some(strategy) = cli.strategy {
        cfg.strategy = strategy.into();
    }
    if let Some(scene) = &cli.scene {
        cfg.scene = scene.clone();
    }
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
