//! Text formatting for catalog entities.

use chrono::NaiveDate;
use shared::CatalogEntity;

pub const UNKNOWN_DATE: &str = "Unknown date";

/// Long-form date, e.g. "April 7, 2013"
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

/// Cut `text` to `max_len` characters, trimming the cut and appending "..."
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let prefix: String = text.chars().take(max_len).collect();
    format!("{}...", prefix.trim())
}

/// One-line listing entry: id, title, subtype, status and start date
pub fn summary_line(entity: &CatalogEntity) -> String {
    let attrs = &entity.attributes;

    let mut tags = Vec::new();
    if let Some(subtype) = attrs.subtype {
        tags.push(subtype.to_string());
    }
    if let Some(status) = attrs.status {
        tags.push(status.to_string());
    }
    if let Some(episodes) = attrs.episode_count {
        tags.push(format!("{} ep", episodes));
    }

    let mut line = format!("[{:>6}] {}", entity.id, attrs.title);
    if !tags.is_empty() {
        line.push_str(&format!(" ({})", tags.join(", ")));
    }
    line.push_str(&format!(" - {}", format_date(attrs.start_date)));
    line
}

/// Multi-line detail block for a single entity
pub fn detail_block(entity: &CatalogEntity, synopsis_len: usize) -> String {
    let attrs = &entity.attributes;
    let mut lines = vec![
        attrs.title.clone(),
        "=".repeat(attrs.title.chars().count()),
        format!("Id:        {}", entity.id),
    ];

    if let Some(subtype) = attrs.subtype {
        lines.push(format!("Type:      {}", subtype));
    }
    if let Some(status) = attrs.status {
        lines.push(format!("Status:    {}", status));
    }
    if let Some(episodes) = attrs.episode_count {
        lines.push(format!("Episodes:  {}", episodes));
    }
    lines.push(format!("Aired:     {}", format_date(attrs.start_date)));
    if attrs.end_date.is_some() {
        lines.push(format!("Ended:     {}", format_date(attrs.end_date)));
    }
    if let Some(rating) = &attrs.average_rating {
        lines.push(format!("Rating:    {}", rating));
    }
    if let Some(url) = entity.poster_url() {
        lines.push(format!("Poster:    {}", url));
    }
    if let Some(url) = entity.cover_url() {
        lines.push(format!("Cover:     {}", url));
    }
    if let Some(video) = &attrs.youtube_video_id {
        lines.push(format!("Trailer:   https://www.youtube.com/watch?v={}", video));
    }

    if !attrs.synopsis.is_empty() {
        lines.push(String::new());
        lines.push(truncate_text(&attrs.synopsis, synopsis_len));
    }

    lines.join("\n")
}
