//! Lightform studio
//!
//! Renders the persisted lighting environment to an HDRI and writes the
//! matching scene code.
//!
//! Run with: cargo run -p lightform_studio -- [--config lightform.toml]

use std::process::ExitCode;

use lightform_studio::{Studio, StudioConfig, StudioResult};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> StudioResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = StudioConfig::load(&args)?;
    config.log_summary();

    let studio = Studio::open(config)?;
    let report = studio.run()?;
    log::info!(
        "Done: {} light(s), {} frame(s), exported {}",
        report.lights,
        report.frames,
        report.export_path.display()
    );
    if let Some(code) = &report.code_path {
        log::info!("Scene code: {}", code.display());
    }
    Ok(())
}
