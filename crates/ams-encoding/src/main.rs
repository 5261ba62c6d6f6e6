//! Copy-codec encoding runner binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ams_client::AmsClient;
use ams_encoding::{EncodingRun, EncodingRunConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("ams=info".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting ams-encode");

    let config = match EncodingRunConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid encoding config: {}", e);
            std::process::exit(1);
        }
    };
    info!("Encoding config: {:?}", config);

    let client = match AmsClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create Media Services client: {}", e);
            std::process::exit(1);
        }
    };

    let run = EncodingRun::new(client, config);
    let outcome = match run.execute().await {
        Ok(o) => o,
        Err(e) => {
            error!("Encoding run failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        job = %outcome.job_name,
        output_asset = %outcome.output_asset,
        state = %outcome.state,
        files = outcome.downloaded_files.len(),
        "Encoding run finished"
    );

    for url in &outcome.streaming_urls {
        println!("{}", url);
    }

    if !outcome.is_finished() {
        error!("Job {} did not finish in time ({})", outcome.job_name, outcome.state);
        std::process::exit(1);
    }
}
