use std::{process, sync::Arc};

use kindle_digest::{
    CliConverter, Config, DigestPipeline, Error, TransportConfig, api, delivery, telemetry,
};
use tracing::{dispatcher, error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_error(&error);
        process::exit(1);
    }
}

fn report_error(error: &Error) {
    if dispatcher::has_been_set() {
        error!(error = %error, "kindle-digestd failed");
    } else {
        eprintln!("kindle-digestd: {error}");
    }
}

async fn run() -> Result<(), Error> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env()?);
    telemetry::init(&config.logging)?;

    log_config(&config);

    let converter = Arc::new(CliConverter::from_config(&config.converter));
    info!(binary = %converter.binary_path().display(), "converter configured");

    let delivery = delivery::from_config(&config.delivery)?;
    let pipeline = Arc::new(DigestPipeline::new(config.clone(), converter, delivery));

    api::start_api_server(pipeline, config).await
}

/// Startup summary, without credentials
fn log_config(config: &Config) {
    let endpoint = match &config.delivery.transport {
        TransportConfig::Mailgun(mailgun) => format!("{} ({})", mailgun.api_base, mailgun.domain),
        TransportConfig::Smtp(smtp) => format!("{}:{}", smtp.host, smtp.port),
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        output_dir = %config.output.directory.display(),
        naming = ?config.output.naming,
        device_format = config.output.device_format.as_deref().unwrap_or("none"),
        transport = config.delivery.transport.name(),
        endpoint = %endpoint,
        bind_address = %config.api.bind_address,
        "kindle-digestd starting"
    );
}
