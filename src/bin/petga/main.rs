mod cli;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FrametimesArgs, LoganArgs, MeanFramesArgs, NormalizeArgs, RoiStatsArgs};
use petga::logan::{regional_logan, LoganAnalysis, LoganOptions, Reference};
use petga::roi::{
    normalize_by_region, region_stats, write_region_stats, write_regional_fits, RegionStatsOptions,
    RoiLabels,
};
use petga::tac::write_tac;
use petga::timing::{read_frametimes, write_frametimes};
use petga::volume::{load_mask, load_series, mean_frames, save_volume, sum_frames, VolumeSource};

fn init_logging(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Logan(args) => run_logan(args),
        Commands::Frametimes(args) => run_frametimes(args),
        Commands::RoiStats(args) => run_roi_stats(args),
        Commands::Normalize(args) => run_normalize(args),
        Commands::MeanFrames(args) => run_mean_frames(args),
    }
}

fn logan_options(args: &LoganArgs) -> Result<LoganOptions> {
    let mut options = match &args.config {
        Some(path) => LoganOptions::from_json(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => LoganOptions::default(),
    };
    if let Some(k2ref) = args.k2ref {
        options.k2ref = k2ref;
    }
    if let Some(start) = args.window_start {
        options.window.0 = start;
    }
    if let Some(end) = args.window_end {
        options.window.1 = end;
    }
    options.show_progress |= args.progress;
    options.validate()?;
    Ok(options)
}

fn run_logan(args: LoganArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build_global()
            .map_err(|e| anyhow::anyhow!("failed to configure thread pool: {}", e))?;
    }
    let options = logan_options(&args)?;

    let source = series_source(&args.volume, &args.frames);
    let timing = read_frametimes(&args.timing, args.time_unit)
        .with_context(|| format!("failed to read timing table {}", args.timing.display()))?;
    let (data, _) = load_series(&source).context("failed to load dynamic series")?;
    let (reference_mask, _) = load_mask(&args.reference)
        .with_context(|| format!("failed to load reference mask {}", args.reference.display()))?;
    let (tissue_mask, header) = load_mask(&args.mask)
        .with_context(|| format!("failed to load tissue mask {}", args.mask.display()))?;
    tracing::info!(
        "loaded series {:?} with {} timing rows",
        data.shape(),
        timing.len()
    );

    let result = LoganAnalysis::new(&data, &timing, Reference::Mask(&reference_mask), &tissue_mask)
        .with_options(options.clone())
        .run()?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let out = |name: &str| args.out.join(name);

    save_volume(out("DVR.nii.gz"), &result.dvr, &header)?;
    save_volume(out("residuals.nii.gz"), &result.residuals, &header)?;

    if let Err(e) = write_tac(
        out("reference_tac.csv"),
        &result.midframes,
        timing.unit(),
        &result.reference,
    ) {
        tracing::warn!("could not write reference TAC: {}", e);
    }

    write_json(&out("summary.json"), &result.summary)?;

    if let (Some(labels_path), Some(rois_path)) = (&args.labels, &args.rois) {
        let (labels, _) = load_mask(labels_path)
            .with_context(|| format!("failed to load label image {}", labels_path.display()))?;
        let rois = RoiLabels::from_csv(rois_path)
            .with_context(|| format!("failed to read ROI definitions {}", rois_path.display()))?;
        let fits = regional_logan(&data, &timing, &labels, &rois, &result.reference, &options)?;
        write_regional_fits(&fits, out("regional_dvr.csv"))?;
    }

    println!("{}", result.summary);
    Ok(())
}

fn series_source(volume: &Option<PathBuf>, frames: &[PathBuf]) -> VolumeSource {
    match volume {
        Some(path) => VolumeSource::SingleVolume(path.clone()),
        None => VolumeSource::VolumeSequence(frames.to_vec()),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn run_frametimes(args: FrametimesArgs) -> Result<()> {
    let table = read_frametimes(&args.input, args.from)
        .with_context(|| format!("failed to read timing table {}", args.input.display()))?;
    let converted = table.to_unit(args.to);
    write_frametimes(&converted, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(
        "converted {} frames from {} to {}",
        converted.len(),
        args.from,
        args.to
    );
    Ok(())
}

fn run_roi_stats(args: RoiStatsArgs) -> Result<()> {
    let (labels, _) = load_mask(&args.labels)
        .with_context(|| format!("failed to load label image {}", args.labels.display()))?;
    let (data, _) = load_mask(&args.data)
        .with_context(|| format!("failed to load data image {}", args.data.display()))?;
    let other = match &args.other_mask {
        Some(path) => Some(
            load_mask(path)
                .with_context(|| format!("failed to load mask {}", path.display()))?
                .0,
        ),
        None => None,
    };
    let rois = RoiLabels::from_csv(&args.rois)
        .with_context(|| format!("failed to read ROI definitions {}", args.rois.display()))?;

    let mut options = RegionStatsOptions::default()
        .with_other_threshold(args.other_threshold.unwrap_or(0.0));
    if let Some(percent) = args.top_percent {
        options = options.with_top_fraction(percent / 100.0);
    }

    let stats = region_stats(&labels, &data, &rois, other.as_ref(), &options)?;
    write_region_stats(&stats, &args.out)?;
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let (image, header) = load_mask(&args.image)
        .with_context(|| format!("failed to load image {}", args.image.display()))?;
    let (mask, _) = load_mask(&args.mask)
        .with_context(|| format!("failed to load mask {}", args.mask.display()))?;
    let normed = normalize_by_region(&image, &mask)?;
    save_volume(&args.out, &normed, &header)?;
    Ok(())
}

fn run_mean_frames(args: MeanFramesArgs) -> Result<()> {
    let source = series_source(&args.volume, &args.frames);
    let (data, header) = load_series(&source).context("failed to load dynamic series")?;
    let image = if args.sum {
        sum_frames(&data, args.first, args.last)?
    } else {
        mean_frames(&data, args.first, args.last)?
    };
    save_volume(&args.out, &image, &header)?;
    tracing::info!(
        "wrote frames {}..={} of {} to {}",
        args.first,
        args.last,
        data.shape()[3],
        args.out.display()
    );
    Ok(())
}
