//! Tracing setup for the `homelab` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, or `debug` for
/// this crate when `verbose` is on. Stdout is left to command output.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,homelab_core=debug,homelab=debug"
    } else {
        "warn"
    }
}
