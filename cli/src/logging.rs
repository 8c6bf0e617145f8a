use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// Level selected by the number of `-v` flags.
pub const fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, takes precedence
/// over the verbosity flag. Output goes to stderr so that `--dry-run` output
/// on stdout stays clean.
pub fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for_verbosity(verbose).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
