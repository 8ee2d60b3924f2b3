//! Sync command - deliver a background sync event

use crate::cli::args::SyncArgs;
use crate::cli::runtime::{NetworkMode, Runtime};
use crate::config::Config;
use crate::error::SwResult;
use crate::ui::{self, UiContext};
use crate::worker::Event;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let runtime = Runtime::open(config, NetworkMode::Offline).await?;
    let worker = runtime.active_worker(config).await?;

    let event = if args.periodic {
        Event::PeriodicSync { tag: args.tag }
    } else {
        Event::Sync { tag: args.tag }
    };
    let kind = event.kind();
    worker.dispatch(event).await?;

    ui::step_ok(&ctx, &format!("{} event acknowledged", kind));
    Ok(())
}
