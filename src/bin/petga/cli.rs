use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use petga::timing::TimeUnit;

#[derive(Debug, Parser)]
#[command(name = "petga", version, about = "Logan graphical analysis for dynamic PET")]
pub struct Cli {
    /// Raise log verbosity to debug
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Voxelwise (and optionally regional) Logan DVR
    Logan(LoganArgs),
    /// Convert a frame timing table between units
    Frametimes(FrametimesArgs),
    /// Mean, std and voxel count per labelled region
    RoiStats(RoiStatsArgs),
    /// Divide an image by its mean inside a mask
    Normalize(NormalizeArgs),
    /// Mean (or sum) of a range of frames as a static image
    MeanFrames(MeanFramesArgs),
}

#[derive(Debug, Args)]
pub struct LoganArgs {
    /// 4D dynamic series
    #[arg(long, conflicts_with = "frames", required_unless_present = "frames")]
    pub volume: Option<PathBuf>,

    /// One 3D file per frame, in frame order
    #[arg(long, num_args = 1.., required_unless_present = "volume")]
    pub frames: Vec<PathBuf>,

    /// Frame timing CSV
    #[arg(long)]
    pub timing: PathBuf,

    #[arg(long, default_value = "sec", help = "Unit of the timing table: ms|sec|min")]
    pub time_unit: TimeUnit,

    /// Reference region mask
    #[arg(long)]
    pub reference: PathBuf,

    /// Tissue (brain) mask
    #[arg(long)]
    pub mask: PathBuf,

    /// Output directory, created if missing
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Reference efflux rate constant (1/min)")]
    pub k2ref: Option<f64>,

    #[arg(long, help = "Steady-state window start (min)")]
    pub window_start: Option<f64>,

    #[arg(long, help = "Steady-state window end (min)")]
    pub window_end: Option<f64>,

    /// JSON file with Logan options; flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Label image for regional fits
    #[arg(long, requires = "rois")]
    pub labels: Option<PathBuf>,

    /// ROI definitions (name,label,label,...)
    #[arg(long, requires = "labels")]
    pub rois: Option<PathBuf>,

    #[arg(long, help = "Number of threads (default: all cores)")]
    pub threads: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

#[derive(Debug, Args)]
pub struct FrametimesArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "ms")]
    pub from: TimeUnit,

    #[arg(long, default_value = "sec")]
    pub to: TimeUnit,

    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct RoiStatsArgs {
    #[arg(long)]
    pub labels: PathBuf,

    #[arg(long)]
    pub data: PathBuf,

    #[arg(long)]
    pub rois: PathBuf,

    /// Additional mask, e.g. a grey-matter probability map
    #[arg(long)]
    pub other_mask: Option<PathBuf>,

    #[arg(long, requires = "other_mask", help = "Additional mask must exceed this (default 0)")]
    pub other_threshold: Option<f64>,

    #[arg(long, help = "Summarise only the highest N percent of each ROI (0-100]")]
    pub top_percent: Option<f64>,

    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long)]
    pub mask: PathBuf,

    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct MeanFramesArgs {
    /// 4D dynamic series
    #[arg(long, conflicts_with = "frames", required_unless_present = "frames")]
    pub volume: Option<PathBuf>,

    /// One 3D file per frame, in frame order
    #[arg(long, num_args = 1.., required_unless_present = "volume")]
    pub frames: Vec<PathBuf>,

    #[arg(long, help = "First frame, 0-based")]
    pub first: usize,

    #[arg(long, help = "Last frame, inclusive")]
    pub last: usize,

    /// Write the sum instead of the mean
    #[arg(long, default_value_t = false)]
    pub sum: bool,

    #[arg(long)]
    pub out: PathBuf,
}
