use super::context::AppContext;
use super::render;
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_core::{AddOutcome, KeyDispatcher, QueryOutcome, SearchState, Session, ENTER, ESCAPE, MIN_QUERY_LEN};
use popcorn_models::UserRating;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

const PROMPT: &str = "popcorn> ";

const HELP: &str = "\
Type a title to search (at least 3 characters).
  <empty line>   focus the search and clear it (Enter)
  :open N|ID     open result N, or a title by IMDb ID; again to close
  :rate N        rate the open title 1-10
  :add           add the open, rated title to your watched list
  :rm ID         remove a title from your watched list
  :list          show your watched list
  :esc           close the open title (Escape)
  :help          show this help
  :quit          leave";

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Enter,
    Escape,
    Open(&'a str),
    Rate(&'a str),
    Add,
    Remove(&'a str),
    List,
    Help,
    Quit,
    Unknown(&'a str),
    Query(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Enter;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Query(line);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "esc" | "escape" => Command::Escape,
        "open" | "o" => Command::Open(arg),
        "rate" | "r" => Command::Rate(arg),
        "add" | "a" => Command::Add,
        "rm" | "remove" => Command::Remove(arg),
        "list" | "l" => Command::List,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

/// Result N (1-based) of the current search, or the argument itself as an IMDb ID
fn resolve_target(arg: &str, state: &SearchState) -> Option<String> {
    if arg.is_empty() {
        return None;
    }
    match arg.parse::<usize>() {
        Ok(n) => n
            .checked_sub(1)
            .and_then(|i| state.results.get(i))
            .map(|m| m.imdb_id.clone()),
        Err(_) => Some(arg.to_string()),
    }
}

fn is_displayable(state: &SearchState) -> bool {
    !state.is_loading && state.query.chars().count() >= MIN_QUERY_LEN
}

pub async fn run_browse(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create data directories: {}", e))?;

    let mut session = ctx.session(KeyDispatcher::new());
    let mut search_rx = session.subscribe();
    let mut last_rendered: Option<SearchState> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    output.println(format!("{} {}", "🍿".bold(), ctx.config.ui.default_title.bold()));
    output.println(":help for commands");
    render_watched(&session, output);
    output.print(PROMPT)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                tracing::debug!(input = %line, "Browse input");
                if !handle_line(&mut session, &line, output).await? {
                    break;
                }
                output.print(PROMPT)?;
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search_rx.borrow_and_update().clone();
                if is_displayable(&state) && last_rendered.as_ref() != Some(&state) {
                    output.println("");
                    render_search(&state, output);
                    last_rendered = Some(state);
                    output.print(PROMPT)?;
                }
            }
        }
    }

    output.println("");
    Ok(())
}

/// Returns false when the session should end
async fn handle_line(session: &mut Session, line: &str, output: &Output) -> Result<bool> {
    match parse_command(line) {
        Command::Quit => return Ok(false),
        Command::Help => output.println(HELP),
        Command::Enter => {
            let was_focused = session.is_search_focused();
            session.handle_key(ENTER);
            if !was_focused {
                output.info("Search focused and cleared");
            }
        }
        Command::Escape => {
            let was_open = session.detail().is_open();
            session.handle_key(ESCAPE);
            if was_open {
                output.info("Closed");
            }
        }
        Command::Query(query) => match session.set_query(query) {
            QueryOutcome::Cleared => {
                output.info(format!("Type at least {} characters to search", MIN_QUERY_LEN));
            }
            QueryOutcome::Searching => output.println("Searching...".bright_black().to_string()),
            QueryOutcome::Unchanged => {}
        },
        Command::Open(arg) => {
            let Some(id) = resolve_target(arg, &session.search_state()) else {
                output.warn("Usage: :open N (a result number) or :open IMDB_ID");
                return Ok(true);
            };
            session.select(&id).await;
            render_detail(session, output);
        }
        Command::Rate(arg) => {
            if session.detail().detail().is_none() {
                output.warn("Open a movie first with :open N");
                return Ok(true);
            }
            match arg.parse::<u8>().map_err(|_| ()).and_then(|n| UserRating::new(n).map_err(|_| ())) {
                Ok(rating) => {
                    session.rate(rating);
                    output.success(format!("Rated {} ⭐  (:add to save it)", rating));
                }
                Err(()) => output.warn("Usage: :rate N with N between 1 and 10"),
            }
        }
        Command::Add => match session.add_current() {
            Ok(AddOutcome::Added(record)) => {
                output.success(format!("Added \"{}\" to your watched list", record.title));
                render_watched(session, output);
            }
            Ok(AddOutcome::AlreadyWatched(rating)) => output.info(render::rated_line(rating)),
            Ok(AddOutcome::NotReady) => output.warn("Open a movie and rate it first (:open N, :rate N)"),
            Err(e) => output.error(format!("Failed to save watched list: {}", e)),
        },
        Command::Remove(arg) => {
            if arg.is_empty() {
                output.warn("Usage: :rm IMDB_ID");
                return Ok(true);
            }
            match session.remove_watched(arg) {
                Ok(()) => render_watched(session, output),
                Err(e) => output.error(format!("Failed to save watched list: {}", e)),
            }
        }
        Command::List => render_watched(session, output),
        Command::Unknown(name) => output.warn(format!("Unknown command :{} (try :help)", name)),
    }
    Ok(true)
}

fn render_search(state: &SearchState, output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "type": "search",
            "query": state.query,
            "results": state.results,
            "error": state.error,
        }));
        return;
    }

    if let Some(error) = &state.error {
        output.error(error);
        return;
    }
    output.println(render::results_table(&state.results).to_string());
}

fn render_detail(session: &Session, output: &Output) {
    let view = session.detail();
    if !view.is_open() {
        output.info("Closed");
        return;
    }

    let watched = view
        .selected_id()
        .and_then(|id| session.watched().iter().find(|r| r.imdb_id == id));
    if !output.is_human() {
        output.json(&json!({
            "type": "detail",
            "detail": view.detail(),
            "error": view.error(),
            "watched": watched,
        }));
        return;
    }

    if let Some(error) = view.error() {
        output.error(error);
        return;
    }
    if let Some(detail) = view.detail() {
        output.println(render::detail_table(detail).to_string());
    }

    match watched {
        Some(record) => output.info(render::rated_line(record.user_rating)),
        None => output.info(":rate N then :add to save it, :esc to close"),
    }
}

fn render_watched(session: &Session, output: &Output) {
    let summary = session.summary();
    if !output.is_human() {
        output.json(&json!({
            "type": "watched",
            "summary": summary,
            "items": session.watched(),
        }));
        return;
    }

    output.println(render::summary_line(&summary));
    if !session.watched().is_empty() {
        output.println(render::watched_table(session.watched()).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popcorn_models::MovieSummary;

    fn state_with(ids: &[&str]) -> SearchState {
        SearchState {
            query: "matrix".to_string(),
            results: ids
                .iter()
                .map(|id| MovieSummary {
                    imdb_id: id.to_string(),
                    title: "The Matrix".to_string(),
                    year: "1999".to_string(),
                    poster: None,
                })
                .collect(),
            is_loading: false,
            error: None,
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(""), Command::Enter);
        assert_eq!(parse_command("   "), Command::Enter);
        assert_eq!(parse_command("inception"), Command::Query("inception"));
        assert_eq!(parse_command(":open 2"), Command::Open("2"));
        assert_eq!(parse_command(":rate  9 "), Command::Rate("9"));
        assert_eq!(parse_command(":esc"), Command::Escape);
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(parse_command(":bogus"), Command::Unknown("bogus"));
    }

    #[test]
    fn test_resolve_target() {
        let state = state_with(&["tt0133093", "tt0234215"]);
        assert_eq!(resolve_target("2", &state), Some("tt0234215".to_string()));
        assert_eq!(resolve_target("0", &state), None);
        assert_eq!(resolve_target("3", &state), None);
        assert_eq!(resolve_target("tt1375666", &state), Some("tt1375666".to_string()));
        assert_eq!(resolve_target("", &state), None);
    }

    #[test]
    fn test_is_displayable() {
        let mut state = state_with(&["tt0133093"]);
        assert!(is_displayable(&state));
        state.is_loading = true;
        assert!(!is_displayable(&state));
        state.is_loading = false;
        state.query = "ma".to_string();
        assert!(!is_displayable(&state));
    }
}
