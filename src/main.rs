use anyhow::Context;
use eyeloc_rs::eye_pipeline::{
    EyeFeaturePipeline, Raster, StageObserver, ThresholdConfig, TiffDumpObserver, read_tiff,
};
use eyeloc_rs::logger;

use tracing::{error, info};

/// Usage: `eyeloc_rs [eye_roi.tiff] [dump_dir]`
fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting eyeloc...");

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "eye_roi.tiff".to_string());
    let dump_dir = args.next();

    let sclera = ThresholdConfig::sclera();
    let pupil = ThresholdConfig::pupil();
    info!("Sclera config: {:?}", sclera);
    info!("Pupil config: {:?}", pupil);

    let roi = read_tiff(&input).with_context(|| format!("loading eye ROI from {}", input))?;
    info!("Loaded {}x{} eye ROI with {} channel(s)", roi.width, roi.height, roi.channels);

    match dump_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir))?;
            info!("Dumping stage rasters to {}", dir);
            let observer = TiffDumpObserver::new(&dir, "eye");
            run(&EyeFeaturePipeline::with_observer(observer, sclera, pupil), &roi);
        }
        None => run(&EyeFeaturePipeline::new(sclera, pupil), &roi),
    }

    Ok(())
}

fn run<O: StageObserver>(pipeline: &EyeFeaturePipeline<O>, roi: &Raster) {
    match pipeline.localize_with_timings(roi) {
        Ok((result, timings)) => {
            info!(
                "Sclera center: ({}, {})",
                result.sclera_center.x, result.sclera_center.y
            );
            info!(
                "Pupil center: ({}, {})",
                result.pupil_center.x, result.pupil_center.y
            );
            timings.log_summary();
        }
        Err(e) => error!("Localization failed: {}", e),
    }
}
