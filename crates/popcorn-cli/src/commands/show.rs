use super::context::AppContext;
use super::render;
use super::ui::Spinner;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::DetailView;
use serde_json::json;
use std::sync::Arc;

pub async fn run_show(imdb_id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched = ctx.watched();

    let mut view = DetailView::new(Arc::clone(&ctx.source), Arc::clone(&ctx.title));
    let pending = view.begin_open(&imdb_id);
    let spinner = view.is_loading().then(|| Spinner::start(format!("Loading {}...", pending.imdb_id())));
    let fetched = pending.fetch().await;
    if let Some(spinner) = spinner {
        spinner.finish();
    }
    view.complete(fetched);

    let existing = watched.get(&imdb_id);

    if !output.is_human() {
        output.json(&json!({
            "type": "detail",
            "imdb_id": imdb_id,
            "detail": view.detail(),
            "error": view.error(),
            "watched": existing,
        }));
        return Ok(());
    }

    if let Some(error) = view.error() {
        output.error(error);
        return Ok(());
    }

    if let Some(detail) = view.detail() {
        output.println(render::detail_table(detail).to_string());
    }

    match existing {
        Some(record) => output.info(render::rated_line(record.user_rating)),
        None => output.info(format!("Rate it with: popcorn rate {} <1-10>", imdb_id)),
    }
    Ok(())
}
