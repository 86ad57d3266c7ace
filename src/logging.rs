//! Diagnostic output for the command-line tool.
//!
//! Library code only emits `tracing` events; the binary decides where they go.
//! Diagnostics always go to stderr so `--json` output on stdout stays clean.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "ai_history_search=debug,info";

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output for this
/// crate with `verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
