use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use ideabox_core::models::NewIdea;
use ideabox_core::utils::{format_timestamp, truncate_string};

use super::{explain, require_route, SUBMIT_ROUTE};
use crate::app::App;

/// Maximum title width in the idea list
const TITLE_WIDTH: usize = 40;

/// Maximum summary width in the idea list
const SUMMARY_WIDTH: usize = 60;

pub async fn list(app: &App) -> Result<()> {
    let ideas = app.client.list_ideas().await.map_err(explain)?;
    if ideas.is_empty() {
        println!("No ideas yet.");
        return Ok(());
    }

    for idea in &ideas {
        println!(
            "#{:<5} {:<width$}  {}  {}",
            idea.id,
            truncate_string(&idea.title, TITLE_WIDTH),
            idea.author,
            format_timestamp(idea.created(), &idea.created_at),
            width = TITLE_WIDTH,
        );
        println!("       {}", truncate_string(&idea.content_summary, SUMMARY_WIDTH));
    }
    Ok(())
}

pub async fn show(app: &App, id: i64) -> Result<()> {
    let idea = app.client.idea(id).await.map_err(explain)?;

    println!("{}", idea.title);
    println!(
        "by {} on {}",
        idea.author,
        format_timestamp(idea.created(), &idea.created_at)
    );
    if let Some(ref url) = idea.image_url {
        println!("image: {}", url);
    }
    println!();
    println!("{}", idea.content);
    Ok(())
}

async fn upload(app: &App, path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Not a file: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let stored = app.client.upload_image(filename, bytes).await?;
    println!("Uploaded {}", stored);
    Ok(stored)
}

/// The image goes up first; the idea refers to it by its stored name.
async fn upload_and_submit(
    app: &App,
    title: String,
    content: String,
    image: Option<PathBuf>,
) -> Result<String> {
    let image_filename = match image {
        Some(ref path) => Some(upload(app, path).await?),
        None => None,
    };
    let idea = NewIdea {
        title,
        content,
        image_filename,
    };
    app.client.submit_idea(&idea).await
}

pub async fn submit(
    app: &App,
    title: String,
    content: String,
    image: Option<PathBuf>,
) -> Result<()> {
    require_route(&app.router, SUBMIT_ROUTE)?;
    let location = app.router.subscribe();

    match upload_and_submit(app, title, content, image).await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            if location.has_changed().unwrap_or(false) {
                eprintln!("Your session ended; returned to {}", app.router.current());
            }
            Err(explain(e))
        }
    }
}
