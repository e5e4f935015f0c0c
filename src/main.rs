use log::{error, info, warn};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::time::{sleep, Duration};

use homgar_poller::cloud::{ApiClient, ReqwestTransport};
use homgar_poller::config::{load_session_state, save_session_state, PollerConfig};
use homgar_poller::decoding::DecoderRegistry;
use homgar_poller::models::PollResult;
use homgar_poller::poller::Poller;
use homgar_poller::utils::{duration_to_seconds, format_datetime, summarize_record};

async fn main_loop(config: PollerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting HomGar polling service against {}", config.base_url);

    let transport = Arc::new(ReqwestTransport::new(config.base_url.clone())?);
    let client = ApiClient::new(transport, config.credentials.clone());

    // Reuse the last session so restarts do not force a new login
    if let Some(path) = &config.session_file {
        if let Some(state) = load_session_state(path) {
            info!("Restored session from {}", path.display());
            client.session().restore(state).await;
        }
    }

    let poller = Poller::new(
        client,
        DecoderRegistry::with_builtin_models(),
        config.home_ids.clone(),
    );
    let mut last_result: Option<PollResult> = None;

    loop {
        let start_time = OffsetDateTime::now_utc();
        info!("Starting poll cycle at: {}", format_datetime(&start_time));

        match poller.poll().await {
            Ok(result) => {
                for record in result.sensors.values() {
                    for line in summarize_record(record) {
                        info!("{}", line);
                    }
                }

                // Warning if no data collected
                if result.sensors.is_empty() {
                    warn!("No sensors reported during this cycle!");
                }

                if let Some(path) = &config.session_file {
                    let state = poller.client().session().export().await;
                    if let Err(e) = save_session_state(path, &state) {
                        error!("Failed to persist session: {}", e);
                    }
                }

                last_result = Some(result);
            }
            Err(e) => {
                error!("Poll cycle failed: {}", e);
                if let Some(previous) = &last_result {
                    info!(
                        "Keeping previous result with {} sensor(s)",
                        previous.sensors.len()
                    );
                }
            }
        }

        // Wait until next cycle should start
        let elapsed = duration_to_seconds(OffsetDateTime::now_utc() - start_time);
        let wait_time = config.poll_interval_secs.saturating_sub(elapsed);
        if wait_time > 0 {
            info!("Waiting {} seconds until next poll", wait_time);
            sleep(Duration::from_secs(wait_time)).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match PollerConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        Ok(()) = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
