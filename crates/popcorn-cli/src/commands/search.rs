use super::context::AppContext;
use super::render;
use super::ui::Spinner;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{QueryOutcome, SearchController, MIN_QUERY_LEN};
use serde_json::json;
use std::sync::Arc;

pub async fn run_search(query: Vec<String>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let query = query.join(" ");

    let controller = SearchController::new(Arc::clone(&ctx.source));
    if controller.set_query(query.as_str()) == QueryOutcome::Cleared {
        output.warn(format!("Type at least {} characters to search", MIN_QUERY_LEN));
        return Ok(());
    }

    let spinner = Spinner::start(format!("Searching for \"{}\"...", query));
    let state = controller.settled().await;
    spinner.finish();

    if !output.is_human() {
        output.json(&json!({
            "type": "search",
            "query": state.query,
            "results": state.results,
            "error": state.error,
        }));
        return Ok(());
    }

    if let Some(error) = &state.error {
        output.error(error);
        return Ok(());
    }

    output.println(render::results_table(&state.results).to_string());
    output.info(format!("Found {} results", state.results.len()));
    Ok(())
}
