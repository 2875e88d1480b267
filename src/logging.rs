//! Log setup for the binary. Logs go to stderr so `--json` output stays clean.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// INFO by default, DEBUG when verbose. `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
