use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::args::Cli;

/// Install the stderr subscriber. `RUST_LOG` takes precedence over
/// `--log-level`. Returns whether `RUST_LOG` was used.
pub(crate) fn initialize_tracing(args: &Cli) -> bool {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    let env_filter = if from_env {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if let Err(err) = init_result {
        tracing::warn!(error = %err, "tracing already initialized; skipping setup");
    }
    from_env
}
