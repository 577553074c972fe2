use std::io::{self, Write};
use std::sync::Arc;

use newsletter::config::load_config;
use newsletter::dispatcher::Dispatcher;
use newsletter::subscriber::{ChannelSubscriber, Subscriber};
use newsletter::utils::logging;
use newsletter::{DispatchError, DispatchReport, Receive};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&config.logging.level);

    let mut publisher = Dispatcher::new(config.dispatcher.topics.iter().cloned());
    info!(newsletters = ?publisher.newsletters(), "dispatcher ready");

    let tom = Arc::new(Subscriber::new("Tom"));
    let sara = Arc::new(Subscriber::new("Sara"));
    for (topic, sub) in [("Tech", &tom), ("Travel", &tom), ("Travel", &sara)] {
        if let Err(e) = publisher.register(topic, sub.clone()) {
            error!("cannot register {}: {e}", sub.name());
        }
    }

    report(publisher.dispatch("Tech", "Tech Newsletter num 1"));

    publisher.add_newsletter("Videogames");
    let (pipe, mut rx) = ChannelSubscriber::new("pipe");
    let drain = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if writeln!(io::stdout().lock(), "pipe forwarded: {json}").is_err() {
                break;
            }
        }
    });

    let pipe = Arc::new(pipe);
    if let Err(e) = publisher.register("Videogames", pipe.clone()) {
        error!("cannot register {}: {e}", pipe.name());
    }
    report(publisher.dispatch("Videogames", "Videogames Newsletter num 1"));

    // dropping the last sender closes the channel and ends the drain task
    publisher.cleanup_subscriber(pipe.id());
    drop(pipe);
    let _ = drain.await;
}

fn report(outcome: Result<DispatchReport, DispatchError>) {
    match outcome {
        Ok(report) => {
            for failure in &report.failures {
                error!(
                    subscriber = %failure.subscriber,
                    "{} missed the message: {}",
                    failure.name,
                    failure.error
                );
            }
        }
        Err(e) => error!("dispatch failed: {e}"),
    }
}
