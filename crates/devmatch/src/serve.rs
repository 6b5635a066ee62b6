// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `devmatch serve`.
//!
//! Starts the embedding and recommendation hubs, the chat coordinator, the
//! email queue and the reminder cron job, then serves HTTP until a shutdown
//! signal arrives. Shutdown stops the listener and the chat coordinator
//! first, then lets hub workers finish their in-flight calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::TimeDelta;
use tokio::net::TcpListener;
use tracing::{info, warn};

use devmatch_chat::{ChatHub, ChatHubConfig};
use devmatch_config::DevmatchConfig;
use devmatch_config::model::CronTimezone;
use devmatch_core::DevmatchError;
use devmatch_email::{EmailSettings, SmtpEmailQueue};
use devmatch_embedding::{EmbeddingHub, EmbeddingHubConfig, GrpcEmbeddingConnector};
use devmatch_recommendation::{
    GrpcRecommendationConnector, RecommendationHub, RecommendationHubConfig,
};
use devmatch_reminder::{CronScheduler, CronZone, ReminderScheduler, trial_ending_reminders};
use devmatch_resilience::RetryPolicy;
use devmatch_storage::SqliteReminderStore;

use crate::server::{HealthState, router};
use crate::shutdown;

pub fn embedding_hub_config(config: &DevmatchConfig) -> EmbeddingHubConfig {
    let section = &config.embedding;
    EmbeddingHubConfig {
        queue_size: section.queue_size,
        workers: section.workers,
        rpc_timeout: Duration::from_secs(section.rpc_timeout_secs),
        retry: RetryPolicy::linear(Duration::from_secs(section.backoff_step_secs)),
    }
}

pub fn recommendation_hub_config(config: &DevmatchConfig) -> RecommendationHubConfig {
    let section = &config.recommendation;
    RecommendationHubConfig {
        queue_size: section.queue_size,
        workers: section.workers,
        rpc_timeout: Duration::from_secs(section.rpc_timeout_secs),
        retry: RetryPolicy::linear(Duration::from_secs(section.backoff_step_secs)),
        max_attempts: section.max_attempts,
    }
}

pub fn chat_hub_config(config: &DevmatchConfig) -> ChatHubConfig {
    ChatHubConfig {
        broadcast_buffer: config.chat.broadcast_buffer,
        client_buffer: config.chat.client_buffer,
    }
}

pub fn email_settings(config: &DevmatchConfig) -> EmailSettings {
    let email = &config.email;
    EmailSettings {
        enabled: email.enabled,
        smtp_host: email.smtp_host.clone(),
        smtp_port: email.smtp_port,
        smtp_username: email.smtp_username.clone(),
        smtp_password: email.smtp_password.clone(),
        from_address: email.from_address.clone(),
        queue_size: email.queue_size,
    }
}

pub fn cron_zone(timezone: CronTimezone) -> CronZone {
    match timezone {
        CronTimezone::Local => CronZone::Local,
        CronTimezone::Utc => CronZone::Utc,
    }
}

/// Runs until SIGINT or SIGTERM.
pub async fn run_serve(config: DevmatchConfig) -> Result<(), DevmatchError> {
    init_tracing(&config.server.log_level);
    info!("starting devmatch serve");

    let cancel = shutdown::install_signal_handler();

    let store = SqliteReminderStore::open(&config.storage.database_path).await?;
    let (email, email_task) = SmtpEmailQueue::start(&email_settings(&config), cancel.clone())?;
    let reminder = Arc::new(ReminderScheduler::new(
        Arc::new(store),
        Arc::new(email),
        TimeDelta::hours(i64::from(config.scheduler.reminder_window_hours)),
    ));
    let scheduler = CronScheduler::new(cron_zone(config.scheduler.timezone), cancel.clone());
    trial_ending_reminders(&scheduler, &config.scheduler.trial_cron, reminder)?;

    let embedding = EmbeddingHub::start(
        embedding_hub_config(&config),
        Arc::new(GrpcEmbeddingConnector::new(&config.embedding.rpc_address)?),
    );
    let recommendation = RecommendationHub::start(
        recommendation_hub_config(&config),
        Arc::new(GrpcRecommendationConnector::new(
            &config.recommendation.rpc_address,
        )?),
    );
    let (chat, chat_task) = ChatHub::start(chat_hub_config(&config));

    let app = router(HealthState {
        start_time: Instant::now(),
        embedding: embedding.clone(),
        recommendation: recommendation.clone(),
        chat: chat.clone(),
    });

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DevmatchError::Internal(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "listening");

    let stop_chat = chat.clone();
    let signal = cancel.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.cancelled().await;
            // Closing every client buffer ends the websocket sessions.
            stop_chat.shutdown();
        })
        .await;
    if let Err(e) = &served {
        warn!(error = %e, "http server stopped with an error");
        cancel.cancel();
        chat.shutdown();
    }

    if let Err(e) = chat_task.await {
        warn!(error = %e, "chat coordinator ended abnormally");
    }
    scheduler.shutdown().await;
    embedding.shutdown().await;
    recommendation.shutdown().await;
    if let Err(e) = email_task.await {
        warn!(error = %e, "email task ended abnormally");
    }

    info!("devmatch serve shutdown complete");
    served.map_err(|e| DevmatchError::Internal(format!("http server failed: {e}")))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("devmatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
