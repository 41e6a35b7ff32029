use anyhow::Result;

use ideabox_core::models::Draft;

use super::{explain, require_route, SUBMIT_ROUTE};
use crate::app::App;

pub async fn show(app: &App) -> Result<()> {
    require_route(&app.router, SUBMIT_ROUTE)?;
    match app.client.draft().await.map_err(explain)? {
        Some(draft) if !draft.is_empty() => {
            println!("Title:   {}", draft.title);
            println!("Content: {}", draft.content);
        }
        _ => println!("No saved draft."),
    }
    Ok(())
}

pub async fn save(app: &App, title: String, content: String) -> Result<()> {
    require_route(&app.router, SUBMIT_ROUTE)?;
    let draft = Draft { title, content };
    if draft.is_empty() {
        anyhow::bail!("Nothing to save: give a --title or --content");
    }
    let message = app.client.save_draft(&draft).await.map_err(explain)?;
    println!("{}", message);
    Ok(())
}

pub async fn clear(app: &App) -> Result<()> {
    require_route(&app.router, SUBMIT_ROUTE)?;
    let message = app.client.delete_draft().await.map_err(explain)?;
    println!("{}", message);
    Ok(())
}
