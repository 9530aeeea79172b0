/// Logger setup for the command line tool
///
/// Log output goes to stderr so that it never mixes with a converted
/// document written to stdout. The level defaults to `warn`, or `debug`
/// with `verbose`; `RUST_LOG` overrides both.
///
/// # Examples
///
/// ```rust
/// ocit2sumo::logging::init(false);
/// log::warn!("signal group K9 is not scheduled by any program");
/// ```
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    builder.target(env_logger::Target::Stderr).format_timestamp(None);
    // A second call (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}
