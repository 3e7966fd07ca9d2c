/**
 * Pod Catalogs CLI - pod-catalogs
 *
 * Extract, update, filter and compile the translation catalogs of a pod
 */
use pod_catalogs_cli::commands::{cli, main_catalogs};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let matches = cli().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    process::exit(main_catalogs(&matches));
}
