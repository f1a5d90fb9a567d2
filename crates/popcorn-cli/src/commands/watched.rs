use super::context::AppContext;
use super::render;
use super::ui::Spinner;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::DetailView;
use popcorn_models::UserRating;
use serde_json::json;
use std::sync::Arc;

pub async fn run_rate(imdb_id: String, rating: u8, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut watched = ctx.watched();

    if let Some(existing) = watched.get(&imdb_id) {
        output.warn(render::rated_line(existing.user_rating));
        output.println(format!("Remove it first with: popcorn remove {}", imdb_id));
        return Ok(());
    }

    let rating = UserRating::new(rating)?;

    let mut view = DetailView::new(Arc::clone(&ctx.source), Arc::clone(&ctx.title));
    let pending = view.begin_open(&imdb_id);
    let spinner = view.is_loading().then(|| Spinner::start(format!("Loading {}...", pending.imdb_id())));
    let fetched = pending.fetch().await;
    if let Some(spinner) = spinner {
        spinner.finish();
    }
    view.complete(fetched);

    if let Some(error) = view.error() {
        output.error(error);
        return Ok(());
    }

    view.rate(rating);
    let Some(record) = view.to_watched_record() else {
        output.error(format!("Could not load details for {}", imdb_id));
        return Ok(());
    };

    watched
        .add(record.clone())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save watched list: {}", e))?;
    view.close();

    if output.is_human() {
        output.success(format!("Added \"{}\" with rating {} ⭐", record.title, rating));
    } else {
        output.json(&json!({ "type": "added", "record": record }));
    }
    Ok(())
}

pub fn run_remove(imdb_id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut watched = ctx.watched();

    if !watched.contains(&imdb_id) {
        output.info(format!("{} is not in your watched list", imdb_id));
        return Ok(());
    }

    watched
        .remove(&imdb_id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save watched list: {}", e))?;
    output.success(format!("Removed {} from your watched list", imdb_id));
    Ok(())
}

pub fn run_list(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched = ctx.watched();
    let summary = watched.summary();

    if !output.is_human() {
        output.json(&json!({
            "type": "watched",
            "summary": summary,
            "items": watched.items(),
        }));
        return Ok(());
    }

    output.println(render::summary_line(&summary));
    if watched.is_empty() {
        output.info("Nothing here yet. Rate a movie with: popcorn rate <imdb-id> <1-10>");
        return Ok(());
    }
    output.println(render::watched_table(watched.items()).to_string());
    Ok(())
}
