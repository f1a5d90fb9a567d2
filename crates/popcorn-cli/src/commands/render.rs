use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_models::{MovieDetail, MovieSummary, UserRating, WatchedRecord, WatchedSummary};

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

pub fn results_table(results: &[MovieSummary]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header("#"), header("Title"), header("Year"), header("IMDb ID")]);
    for (i, movie) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&movie.title),
            Cell::new(format!("🗓 {}", movie.year)),
            Cell::new(&movie.imdb_id),
        ]);
    }
    table
}

pub fn detail_table(detail: &MovieDetail) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header(&detail.title), Cell::new(&detail.imdb_id)]);

    let rating = detail
        .imdb_rating
        .map(|r| format!("⭐ {:.1} IMDb rating", r))
        .unwrap_or_else(|| "⭐ N/A".to_string());

    table.add_row(vec![Cell::new("Released"), Cell::new(format!("{} • {}", detail.released, detail.runtime_text))]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(&detail.genre)]);
    table.add_row(vec![Cell::new("Rating"), Cell::new(rating)]);
    table.add_row(vec![Cell::new("Plot"), Cell::new(&detail.plot)]);
    table.add_row(vec![Cell::new("Starring"), Cell::new(&detail.actors)]);
    table.add_row(vec![Cell::new("Directed by"), Cell::new(&detail.director)]);
    table
}

pub fn watched_table(records: &[WatchedRecord]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header("Title"),
        header("IMDb ID"),
        header("⭐ IMDb"),
        header("🌟 Yours"),
        header("⏳ Runtime"),
    ]);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.title),
            Cell::new(&record.imdb_id),
            Cell::new(record.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "-".to_string())),
            Cell::new(record.user_rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(record.runtime.map(|m| format!("{} min", m)).unwrap_or_else(|| "-".to_string())),
        ]);
    }
    table
}

pub fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "{} {} movies   ⭐ {:.2}   🌟 {:.2}   ⏳ {:.0} min",
        "Movies you watched:".bold(),
        summary.count,
        summary.avg_imdb_rating,
        summary.avg_user_rating,
        summary.avg_runtime
    )
}

pub fn rated_line(rating: Option<UserRating>) -> String {
    match rating {
        Some(r) => format!("You rated with movie {} ⭐", r),
        None => "You already watched this movie".to_string(),
    }
}
