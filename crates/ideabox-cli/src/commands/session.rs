use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::warn;

use ideabox_core::utils::mask_token;
use ideabox_core::{Config, Slot, TokenStorage};

use crate::app::App;

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim();
    match (line.is_empty(), default) {
        (true, Some(d)) => Ok(d.to_string()),
        _ => Ok(line.to_string()),
    }
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

pub async fn login(app: &App, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email", app.config.last_email.as_deref())?,
    };
    let password = prompt_password()?;
    if email.is_empty() || password.is_empty() {
        bail!("Email and password required");
    }

    app.client.login(&email, &password).await?;

    if let Err(e) = Config::remember_email(&email) {
        warn!(error = %e, "Failed to save config");
    }

    println!("Login successful!");
    Ok(())
}

pub async fn register(app: &App, email: Option<String>, username: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email", None)?,
    };
    let password = prompt_password()?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }

    let message = app
        .client
        .register(username.as_deref(), &email, &password)
        .await?;
    println!("{}", message);
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.client.logout();
    println!("Logged out.");
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    let storage = match app.config.token_storage {
        TokenStorage::File => "file",
        TokenStorage::Keyring => "keyring",
    };
    println!("Server:   {}", app.config.api_base_url);
    println!("Storage:  {}", storage);

    let creds = app.store.credentials();
    match creds.get(Slot::Access) {
        Some(token) => println!("Access:   {}", mask_token(token)),
        None => println!("Access:   (not logged in)"),
    }
    println!(
        "Refresh:  {}",
        if creds.get(Slot::Refresh).is_some() { "stored" } else { "none" }
    );
    if let Some(ref email) = app.config.last_email {
        println!("Email:    {}", email);
    }
    Ok(())
}
