//! Debounce demo command
//!
//! Demo flow: a rapid startup burst at the default category's delay, a
//! switch to a selected category, a second burst, and a direct
//! (non-debounced) burst for comparison.

use anyhow::Result;
use owo_colors::OwoColorize;
use qs_core::{Debouncer, Delay, DelayProfile, Direct, DEFAULT_CATEGORY};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(
    category: &str,
    burst: usize,
    profile_path: Option<&Path>,
    delay_ms: Option<f64>,
) -> Result<()> {
    let profile = match profile_path {
        Some(path) => DelayProfile::load(path)?,
        None => DelayProfile::builtin(),
    };

    let startup_delay = profile.default_delay();
    let selected_delay = match delay_ms {
        Some(ms) => Delay::try_from_millis_f64(ms)?,
        None => profile.delay_for(category)?,
    };

    let counter = Arc::new(AtomicU64::new(0));
    let debounced = Debouncer::spawn(startup_delay, {
        let counter = Arc::clone(&counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    info!(
        "Startup burst: {} attempts at {} ({:?})",
        burst, startup_delay, DEFAULT_CATEGORY
    );
    for _ in 0..burst {
        debounced.attempt();
    }
    settle(startup_delay).await;

    info!("Switching to {:?} at {}", category, selected_delay);
    debounced.reconfigure(selected_delay);
    for _ in 0..burst {
        debounced.attempt();
    }
    settle(selected_delay).await;

    debounced.shutdown().await;
    let debounced_clicks = counter.load(Ordering::SeqCst);

    // Direct path: every attempt lands
    let direct_counter = Arc::new(AtomicU64::new(0));
    let mut direct = Direct::new({
        let counter = Arc::clone(&direct_counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    for _ in 0..burst {
        direct.attempt()?;
    }
    let direct_clicks = direct_counter.load(Ordering::SeqCst);

    println!("{}", "Debounce Demo".bold());
    println!(
        "  {} = {} {}",
        "bursts".cyan(),
        2,
        format!("({} attempts each)", burst).dimmed()
    );
    println!(
        "  {} = {} {}",
        "debounced clicks".cyan(),
        debounced_clicks,
        "(one per burst)".dimmed()
    );
    println!(
        "  {} = {} {}",
        "direct clicks".cyan(),
        direct_clicks,
        "(one per attempt)".dimmed()
    );

    Ok(())
}

/// Wait long enough for a pending invocation at `delay` to fire
async fn settle(delay: Delay) {
    tokio::time::sleep(delay.as_duration() + Duration::from_millis(50)).await;
}
