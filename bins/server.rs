use std::process::ExitCode;

use configs::AppConfig;
use tokio::runtime::Runtime;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env first so RUST_LOG / LOG_FORMAT take effect
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let instance = Uuid::new_v4();
    log_panics(instance);

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %instance,
        version = env!("CARGO_PKG_VERSION"),
        addr = %cfg.server.bind_addr(),
        data_dir = %cfg.storage.data_dir,
        "portfolio server starting"
    );

    match rt.block_on(server::startup::run_with_config(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%instance, error = %e, "portfolio server failed");
            ExitCode::FAILURE
        }
    }
}

/// Route panics through tracing, then fall back to the default report.
fn log_panics(instance: Uuid) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(%instance, panic = %info, "panic");
        default_hook(info);
    }));
}

fn build_runtime(cfg: &AppConfig) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    builder.build()
}
