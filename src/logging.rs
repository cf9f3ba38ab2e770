use tracing_subscriber::EnvFilter;

/// Workspace targets that receive log output.
const TARGETS: &[&str] = &["nimbus", "nimbus_cube", "nimbus_ecc"];

/// Maps the `-v` count to a level: none -> warn, `-v` -> info,
/// `-vv` -> debug, `-vvv` and more -> trace.
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the default filter directive for all workspace targets.
fn default_directive(verbosity: u8) -> String {
    let level = level(verbosity);
    TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing on stderr. `RUST_LOG` overrides the CLI verbosity.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
