//! Install command - register the worker and pre-cache the app

use crate::bootstrap::ClientBootstrap;
use crate::cli::args::InstallArgs;
use crate::cli::runtime::{NetworkMode, Runtime};
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::ui::{self, TaskSpinner, UiContext};
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let runtime = Runtime::open(config, NetworkMode::Online).await?;
    let version = runtime.settings.names.version().clone();

    ui::intro(&ctx, &format!("Installing {}", version));

    // An earlier run may already have this version active
    if !args.force {
        match runtime.resume(config).await {
            Ok(registration) => debug!("Resumed registration for {}", registration.scope()),
            Err(e) => debug!("Nothing to resume: {}", e),
        }
    }

    let mut bootstrap = ClientBootstrap::from_config(&config.registration);
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!(
        "Pre-caching {} static assets from {}",
        runtime.settings.static_assets.len(),
        runtime.settings.origin
    ));

    let report = bootstrap.start(&runtime.registry).await;
    let toasts = bootstrap.take_toasts();

    let Some(report) = report else {
        spinner.stop_error("Registration failed");
        for toast in &toasts {
            ui::toast(&ctx, toast);
        }
        return Err(SwError::RegistrationRejected(format!(
            "{} could not be registered",
            bootstrap.options().script_url
        )));
    };

    match &report.install {
        Some(install) if install.is_complete() => spinner.stop(&format!(
            "Cached {} asset(s) in {}",
            install.cached.len(),
            install.cache
        )),
        Some(install) => {
            spinner.stop_warn(&format!(
                "Cached {} of {} asset(s) in {}",
                install.cached.len(),
                install.cached.len() + install.failed.len(),
                install.cache
            ));
            for (path, reason) in &install.failed {
                ui::step_error_detail(&ctx, path, reason);
            }
        }
        None => spinner.stop(&format!("{} is already active", report.version)),
    }

    if let Some(activate) = &report.activate {
        for name in &activate.deleted {
            ui::step_ok_detail(&ctx, "Deleted stale cache", name);
        }
        for (name, reason) in &activate.failed {
            ui::step_warn_hint(&ctx, &format!("Could not delete {}", name), reason);
        }
        debug!("Claimed {} client(s)", activate.claimed);
    }

    for toast in &toasts {
        ui::toast(&ctx, toast);
    }
    ui::outro_success(
        &ctx,
        &format!("{} active for {}", report.version, report.scope),
    );
    Ok(())
}
