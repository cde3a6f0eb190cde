use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "DAYONE_VAULT_LOG";

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "dayone_vault=info",
        1 => "dayone_vault=debug",
        _ => "dayone_vault=trace",
    }
}

/// Install the stderr subscriber. `DAYONE_VAULT_LOG` takes precedence over `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // try_init leaves an already installed subscriber in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
