use super::list::{RateView, ViewOptions};
use super::ui;
use crate::core::{RateSnapshot, RateStore};
use anyhow::Result;
use chrono::Local;
use console::Term;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

fn render_screen(snapshot: &RateSnapshot, options: &ViewOptions, interval: Duration) {
    let term = Term::stdout();
    let _ = term.clear_screen();
    println!(
        "{}  {}\n",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "updated {} | every {}s | Ctrl-C to stop",
                Local::now().format("%H:%M:%S"),
                interval.as_secs()
            ),
            ui::StyleType::Subtle
        )
    );
    println!("{}", RateView::derive(snapshot, options).render());
}

/// Re-renders the list on every published snapshot until Ctrl-C.
pub async fn run(store: Arc<RateStore>, options: &ViewOptions, interval: Duration) -> Result<()> {
    let cached = store.load_stored().await;
    render_screen(&cached, options, interval);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = store.subscribe(move |snapshot| {
        let _ = tx.send(snapshot);
    });
    let handle = store.start_periodic_refresh(interval)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                info!("Interrupted, stopping watch");
                break;
            }
            Some(snapshot) = rx.recv() => {
                debug!(count = snapshot.len(), "Rendering new snapshot");
                render_screen(&snapshot, options, interval);
            }
        }
    }

    handle.stop().await;
    Ok(())
}
