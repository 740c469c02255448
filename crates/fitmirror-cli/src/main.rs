use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fitmirror_core::{Catalog, DetectionQuality, FaceEstimator, PixelBuffer, PoseEstimator};
use fitmirror_hw::{CameraProvider, FacingMode, Pattern, SyntheticProvider, V4lProvider};
use fitmirror_session::{run_render_loop, spawn_engine, Config, Detection, Session, SessionError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fitmirror", about = "Fitmirror virtual try-on")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List outfits in the catalog
    Outfits {
        /// Print the full catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run face and body detection on an image file
    Detect {
        image: PathBuf,
    },
    /// Overlay an outfit on an image file and save the result
    Capture {
        image: PathBuf,
        /// Outfit ID from the catalog
        #[arg(short, long)]
        outfit: String,
        /// Output path (default: tryon-<outfit>.png in the capture directory)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },
    /// Run a live try-on session against the camera
    Live {
        /// Outfit ID to apply once a body is detected
        #[arg(short, long)]
        outfit: Option<String>,
        /// Number of detection ticks before stopping
        #[arg(long, default_value_t = 50)]
        ticks: u64,
        /// Use the rear camera
        #[arg(long)]
        rear: bool,
        /// Use a synthetic test pattern instead of a camera
        #[arg(long)]
        synthetic: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Outfits { json } => list_outfits(&load_catalog(&config)?, json)?,
        Commands::Detect { image } => {
            let frame = load_frame(&image)?;
            let detection = detect(&config, &frame);
            println!("{}", serde_json::to_string_pretty(&detection)?);
            eprintln!("{}", detection.quality.status_text());
        }
        Commands::Capture { image, outfit, output } => {
            let catalog = load_catalog(&config)?;
            let outfit = catalog.require(&outfit)?;
            let frame = load_frame(&image)?;
            let detection = detect(&config, &frame);

            if !detection.supports_capture() {
                bail!(
                    "cannot capture: {}, body {} (needs above {:.0}%)",
                    detection.quality.status_text(),
                    percent(detection.body_confidence()),
                    fitmirror_render::OVERLAY_BODY_THRESHOLD * 100.0
                );
            }

            let still = fitmirror_render::capture(&frame, Some(outfit), detection.body.as_ref());
            let path = output.unwrap_or_else(|| {
                config
                    .capture_dir
                    .join(fitmirror_render::capture_file_name(Some(outfit)))
            });
            still
                .save(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved {}", path.display());
        }
        Commands::Live {
            outfit,
            ticks,
            rear,
            synthetic,
        } => {
            let catalog = load_catalog(&config)?;
            let outfit = outfit
                .map(|id| catalog.require(&id).cloned())
                .transpose()?;
            let facing = if rear {
                FacingMode::Environment
            } else {
                FacingMode::User
            };
            let provider: Box<dyn CameraProvider> = if synthetic {
                Box::new(SyntheticProvider::new(640, 480, Pattern::Figure))
            } else {
                Box::new(V4lProvider::new(&config.front_device, &config.rear_device))
            };
            live(&config, provider, facing, outfit, ticks).await?;
        }
    }

    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(path).context("failed to load outfit catalog"),
        None => Catalog::builtin().context("built-in catalog is invalid"),
    }
}

fn load_frame(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(PixelBuffer::from(image.to_rgba8()))
}

fn detect(config: &Config, frame: &PixelBuffer) -> Detection {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let face = FaceEstimator::new(config.face_block, config.jitter).estimate(frame, &mut rng);
    let body = PoseEstimator::new(config.body_block).estimate(frame);
    let quality = DetectionQuality::assess(face.as_ref(), body.as_ref());
    Detection { face, body, quality }
}

fn list_outfits(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.list())?);
        return Ok(());
    }
    if catalog.is_empty() {
        println!("No outfits in catalog");
        return Ok(());
    }
    for outfit in catalog.list() {
        println!(
            "{:<4} {:<30} {:<12} ${:>8.2}",
            outfit.id, outfit.name, outfit.occasion, outfit.total_price
        );
        for item in &outfit.items {
            println!("       {:?}: {} ({})", item.kind, item.name, item.color);
        }
    }
    Ok(())
}

async fn live(
    config: &Config,
    provider: Box<dyn CameraProvider>,
    facing: FacingMode,
    outfit: Option<fitmirror_core::Outfit>,
    ticks: u64,
) -> Result<()> {
    let engine = spawn_engine(Session::new(provider, config), config.tick_interval());
    engine
        .start(facing)
        .await
        .context("failed to start camera")?;

    let render = tokio::spawn(run_render_loop(
        engine.subscribe(),
        config.render_interval(),
        |snapshot| {
            if let Some(surface) = snapshot.compose() {
                tracing::trace!(labels = surface.labels().len(), "frame composed");
            }
        },
    ));

    let mut snapshots = engine.subscribe();
    let mut pending_outfit = outfit;
    let mut last_tick = 0;
    while last_tick < ticks {
        snapshots.changed().await.context("engine stopped unexpectedly")?;
        let snapshot = snapshots.borrow_and_update().clone();
        if !snapshot.state.is_active() {
            bail!("session ended: {}", snapshot.error.unwrap_or_default());
        }
        if snapshot.ticks == last_tick {
            continue;
        }
        last_tick = snapshot.ticks;
        println!(
            "tick {:>4}  {:<20} face {:>4}  body {:>4}",
            snapshot.ticks,
            snapshot.status_text(),
            percent(snapshot.detection.face.map(|f| f.confidence)),
            percent(snapshot.detection.body_confidence()),
        );

        if let Some(outfit) = pending_outfit.take() {
            match engine.apply_outfit(outfit.clone()).await {
                Ok(()) => println!("Applied outfit: {}", outfit.name),
                Err(SessionError::GarmentApplyRejected { .. }) => pending_outfit = Some(outfit),
                Err(e) => return Err(e.into()),
            }
        }
    }

    match engine.capture().await? {
        Some(still) => {
            let path = still
                .save(&config.capture_dir)
                .context("failed to write capture")?;
            println!("Saved {}", path.display());
        }
        None if pending_outfit.is_some() => println!("Outfit never applied: body not detected clearly"),
        None => {}
    }

    engine.shutdown().await?;
    let frames = render.await?;
    tracing::info!(frames, "live session finished");
    Ok(())
}

fn percent(confidence: Option<f32>) -> String {
    confidence
        .map(|c| format!("{}%", (c * 100.0).round() as u32))
        .unwrap_or_else(|| "-".to_string())
}
