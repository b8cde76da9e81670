//! Example: a page that loads three resources behind one indicator.
//!
//! Run with `RUST_LOG=debug cargo run --example page_load` to see the
//! controller's diagnostics.

use std::time::Duration;

use loading_steps::{LoadingController, LoadingOptions, LoadingState};
use tracing_subscriber::EnvFilter;

async fn fetch(name: &'static str, latency_ms: u64) -> Result<&'static str, &'static str> {
    tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    if name == "recommendations" {
        Err(name)
    } else {
        Ok(name)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = LoadingOptions::new()
        .with_render_delay(Duration::from_millis(100))
        .with_reset_delay(Duration::from_millis(150))
        .with_done_delay(Duration::from_millis(300))
        .with_name("profile-page");
    let loading = LoadingController::new(3, false, options);

    loading.on_transition(|from, to| {
        let indicator = if to.is_loading() || to == LoadingState::DelayDone {
            "shown"
        } else {
            "hidden"
        };
        tracing::info!(%from, %to, indicator, "loading state changed");
    });

    for episode in 0..2 {
        if episode > 0 {
            tracing::info!("refreshing page");
            loading.reset_loading();
        }

        let mut tasks = Vec::new();
        for (name, latency) in [("profile", 40), ("avatar", 180), ("recommendations", 260)] {
            let loading = loading.clone();
            tasks.push(tokio::spawn(async move {
                match fetch(name, latency).await {
                    Ok(step) => loading.set_step_done(step),
                    Err(step) => {
                        tracing::warn!(step, "fetch failed, skipping");
                        loading.skip_step(step);
                    }
                }
            }));
        }
        for task in tasks {
            if let Err(err) = task.await {
                tracing::warn!(%err, "fetch task did not finish");
            }
        }

        loading
            .wait_for_state(LoadingState::Done)
            .await
            .expect("controller dropped while waiting");
        tracing::info!(progress = ?loading.progress(), "page ready");
    }

    loading.shutdown();
}
