// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;

use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use logstash::{
    adapter::LogstashAdapter, config::AdapterConfig, message::Message, route::Route,
    transport::TransportRegistry,
};

const LOGSTREAM_CAPACITY: usize = 1024;

#[tokio::main]
pub async fn main() {
    let config = match AdapterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logstash-forwarder: {e}");
            return;
        }
    };

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let route = match env::var("LOGSTASH_ROUTE").map(|uri| Route::parse(&uri)) {
        Ok(Ok(route)) => route,
        Ok(Err(e)) => {
            error!("Invalid LOGSTASH_ROUTE: {e}");
            return;
        }
        Err(_) => {
            error!("LOGSTASH_ROUTE not set, nothing to forward to");
            return;
        }
    };

    let registry = TransportRegistry::with_builtin();
    let adapter = match LogstashAdapter::new(route, &config, &registry).await {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Error creating logstash adapter: {e}");
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<Message>(LOGSTREAM_CAPACITY);
    let stream_task = tokio::spawn(adapter.stream(rx));

    info!("logstash-forwarder: reading messages from stdin");
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match serde_json::from_str::<Message>(&line) {
                Ok(message) => {
                    if tx.send(message).await.is_err() {
                        error!("Log stream closed unexpectedly");
                        break;
                    }
                }
                Err(e) => error!("Skipping undecodable message: {e}"),
            },
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {e}");
                break;
            }
        }
    }

    drop(tx);
    if let Err(e) = stream_task.await {
        error!("Log stream task failed: {e}");
    }
    debug!("logstash-forwarder: done");
}
