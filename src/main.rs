use std::env;
use std::sync::Arc;

use tracing_appender::non_blocking::WorkerGuard;

use krb_client::auth::KinitAuthenticator;
use krb_client::transfer::ScpTransfer;

use zeus_launcher::workdir::WorkDir;
use zeus_launcher::workload::Workload;
use zeus_launcher::{bootstrap, lifecycle, LauncherError, Settings};

#[tokio::main]
async fn main() {
    let guard = init_logger();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            1
        }
    };

    // flush the non-blocking writer before the destructor-less exit
    drop(guard);
    std::process::exit(code);
}

async fn run() -> Result<i32, LauncherError> {
    let settings = Settings::from_env()?;

    let root = settings.workdir.clone().unwrap_or_else(WorkDir::default_root);
    let workdir = WorkDir::create(root)?;
    let ticket_cache = settings
        .ticket_cache
        .clone()
        .unwrap_or_else(|| workdir.ticket_cache());

    // Both configs must be in place before the first Kerberos call.
    let transfer = ScpTransfer::new(
        settings.principal.user().to_string(),
        settings.password.to_string(),
    );
    bootstrap::fetch_configs(&transfer, &settings, &workdir).await?;

    let authenticator = Arc::new(KinitAuthenticator::new(
        workdir.krb5_conf(),
        ticket_cache.clone(),
        workdir.keytab(),
    ));
    let manager = bootstrap::bootstrap_credentials(authenticator, &settings).await?;

    let workload = Workload::new(&settings, &workdir, &ticket_cache);
    let renewal = manager.start_renewal();

    Ok(lifecycle::run(renewal, workload).await)
}

fn init_logger() -> Option<WorkerGuard> {
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_log::LogTracer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry};

    if !env::var("JSON_LOG").map_or(false, |s| s.parse().unwrap_or_default()) {
        tracing_subscriber::fmt::init();
        return None;
    }

    // Redirect the logs from log library to tracing's subscribers.
    LogTracer::init().expect("Unable to setup log tracer!");

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    // Non-blocking stdout writer
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);
    tracing::subscriber::set_global_default(subscriber).unwrap();
    Some(guard)
}
