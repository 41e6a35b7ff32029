//! Subcommand implementations.

pub mod draft;
pub mod ideas;
pub mod session;

use anyhow::{anyhow, Result};
use ideabox_core::nav::NavError;
use ideabox_core::{ApiError, Navigation, Router};

use crate::app::App;

/// Route that submitting ideas and editing the draft live behind.
pub(crate) const SUBMIT_ROUTE: &str = "submit-idea";

/// Replace failures a user can act on with a plain message.
pub(crate) fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<ApiError>() {
        Some(e) if e.is_auth_expired() => anyhow!("Session expired. Please log in again."),
        Some(e) if e.is_timeout() => anyhow!("The server did not respond in time. Try again later."),
        _ => err,
    }
}

/// Enter the named route before acting on it, so the login guard applies.
pub(crate) fn require_route(router: &Router, name: &str) -> Result<()> {
    let path = router
        .routes()
        .by_name(name)
        .map(|route| route.path.clone())
        .ok_or_else(|| anyhow!("No route named {} is configured", name))?;

    match router.navigate(&path)? {
        Navigation::Entered { .. } => Ok(()),
        Navigation::Redirected { to } => {
            tracing::debug!(route = name, redirect = %to, "Route requires login");
            Err(anyhow!("Please log in first: run `ideabox login`"))
        }
    }
}

pub fn open(app: &App, path: &str) -> Result<()> {
    let navigation = match app.router.navigate(path) {
        Ok(navigation) => navigation,
        Err(NavError::NotFound(_)) => {
            let known: Vec<&str> = app
                .router
                .routes()
                .routes()
                .iter()
                .map(|route| route.path.as_str())
                .collect();
            return Err(anyhow!("Unknown route {}. Known routes: {}", path, known.join(", ")));
        }
    };

    match navigation {
        Navigation::Entered { route, path } => {
            println!("{} ({})", route.name, path);
        }
        Navigation::Redirected { to } => {
            println!("Login required, redirected to {}", to);
        }
    }
    Ok(())
}
