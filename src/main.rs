use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use skincal::{CalibrationFile, CalibrationSession, SegmentationPipeline, load_frame};

#[derive(Parser)]
#[command(name = "skincal")]
#[command(about = "Tune YCrCb skin-color thresholds for hand detection")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive calibrator
    Calibrate {
        /// Frame showing only the background
        #[arg(value_name = "BACKGROUND")]
        background: PathBuf,

        /// Frames showing the hand in front of the same background
        #[arg(value_name = "SAMPLE", required = true)]
        samples: Vec<PathBuf>,

        /// Calibration file to start from
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Segment one frame without a window
    Segment {
        #[arg(value_name = "BACKGROUND")]
        background: PathBuf,

        #[arg(value_name = "SAMPLE")]
        sample: PathBuf,

        /// Where to write the segmented, masked image
        #[arg(short, long, value_name = "FILE", default_value = "segmented.png")]
        output: PathBuf,

        /// Also write the binary skin mask
        #[arg(long, value_name = "FILE")]
        mask_out: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Print the YCrCb values of one pixel before and after thresholding
    Sample {
        #[arg(value_name = "BACKGROUND")]
        background: PathBuf,

        #[arg(value_name = "SAMPLE")]
        sample: PathBuf,

        #[arg(long)]
        x: u32,

        #[arg(long)]
        y: u32,

        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Write a calibration file with the default thresholds
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn load_calibration(path: Option<&Path>) -> anyhow::Result<CalibrationFile> {
    match path {
        Some(path) => CalibrationFile::load(path),
        None => Ok(CalibrationFile::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Calibrate { background, samples, config } => {
            let calibration = load_calibration(config.as_deref())?;
            let session = CalibrationSession::open(&background, &samples, calibration)?;
            run_gui(session)
        }
        Command::Segment { background, sample, output, mask_out, config, debug_out } => {
            let calibration = load_calibration(config.as_deref())?;
            let background = load_frame(&background)?;
            let frame = load_frame(&sample)?;

            let mut segmentation = SegmentationPipeline::new(background, calibration.thresholds)
                .with_settings(calibration.settings)
                .with_verbose(args.verbose);
            if let Some(dir) = debug_out {
                segmentation = segmentation.with_debug(dir)?;
            }

            let result = segmentation.segment(&frame)?;
            result.image.save(&output)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", output.display(), e))?;

            println!("\n=== Segmentation Results ===");
            println!("Thresholds: {}", calibration.thresholds);
            if let Some(ratio) = result.get_float("foreground_ratio") {
                println!("Foreground: {:.1}% of the frame", ratio * 100.0);
            }
            if let Some(ratio) = result.get_float("skin_ratio") {
                println!("Skin-colored: {:.1}% of the frame", ratio * 100.0);
            }
            println!("Wrote {}", output.display());

            if let Some(mask_path) = mask_out {
                let mask = result
                    .skin_mask
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Pipeline did not produce a skin mask"))?;
                mask.save(&mask_path)
                    .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", mask_path.display(), e))?;
                println!("Wrote {}", mask_path.display());
            }
            Ok(())
        }
        Command::Sample { background, sample, x, y, config } => {
            let calibration = load_calibration(config.as_deref())?;
            let session = CalibrationSession::open(&background, &[sample], calibration)?;
            let report = session.sample(x, y)?;

            println!("Sample at ({},{})", report.x, report.y);
            println!("  Original YCC:  {:?}", report.original_ycc);
            println!("  Original RGB:  {:?}", report.original_rgb);
            println!("  Segmented YCC: {:?}", report.segmented_ycc);
            println!("  Verdict: {}", if report.is_skin() { "skin" } else { "rejected" });
            Ok(())
        }
        Command::InitConfig { path } => {
            CalibrationFile::default().save(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

#[cfg(feature = "gui")]
fn run_gui(session: CalibrationSession) -> anyhow::Result<()> {
    skincal::gui::run(session).map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

#[cfg(not(feature = "gui"))]
fn run_gui(_session: CalibrationSession) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("skincal was built without the `gui` feature"))
}
