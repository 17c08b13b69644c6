use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// RUST_LOG wins; otherwise `--verbose` means debug, else `default_level`
/// from the config file.
pub fn init(verbose: bool, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { default_level };
        EnvFilter::new(format!("vibetimer={level},vibetimer_core={level}"))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
