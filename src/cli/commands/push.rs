//! Push command - deliver a push message to the active worker

use crate::cli::args::PushArgs;
use crate::cli::runtime::{NetworkMode, Runtime};
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::ui::{self, UiContext};
use crate::worker::{ClickOutcome, Event, EventOutcome};
use bytes::Bytes;

/// Execute the push command
pub async fn execute(args: PushArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let runtime = Runtime::open(config, NetworkMode::Offline).await?;
    let worker = runtime.active_worker(config).await?;

    let payload = args.payload.map(Bytes::from);
    let notification = match worker.dispatch(Event::Push(payload)).await? {
        EventOutcome::Pushed(Some(notification)) => notification,
        EventOutcome::Pushed(None) => {
            ui::step_info(&ctx, "Push ignored: no usable payload");
            return Ok(());
        }
        other => {
            return Err(SwError::User(format!("unexpected push outcome: {:?}", other)));
        }
    };

    ui::step_ok_detail(&ctx, &notification.title, &notification.body);
    ui::key_value(&ctx, "Actions", &notification.actions.join(", "));

    let Some(action) = args.click else {
        return Ok(());
    };
    let click = Event::NotificationClick {
        notification: notification.id,
        action: Some(action),
    };
    match worker.dispatch(click).await? {
        EventOutcome::Clicked(ClickOutcome::Focused(window)) => {
            ui::step_ok_detail(&ctx, "Focused window", window.url.as_str())
        }
        EventOutcome::Clicked(ClickOutcome::Opened(window)) => {
            ui::step_ok_detail(&ctx, "Opened window", window.url.as_str())
        }
        EventOutcome::Clicked(ClickOutcome::Dismissed) => {
            ui::step_info(&ctx, "Notification dismissed")
        }
        other => {
            return Err(SwError::User(format!("unexpected click outcome: {:?}", other)));
        }
    }
    Ok(())
}
