use chrono::DateTime;
use chrono_tz::Tz;

use crate::journal::dates::frontmatter_stamp;
use crate::journal::export::{Entry, Location, Weather};

/// Undo Day One's markdown escaping and its private line-break characters.
pub fn clean_text(raw: &str) -> String {
    raw.replace('\\', "")
        .replace('\u{2028}', "\n")
        .replace('\u{1c6a}', "\n\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn weather_line(weather: &Weather) -> Option<String> {
    let conditions = non_empty(&weather.conditions_description);
    let temperature = weather.temperature_celsius.map(|t| format!("{t:.0}°C"));
    match (conditions, temperature) {
        (Some(c), Some(t)) => Some(format!("{c} {t}")),
        (Some(c), None) => Some(c.to_string()),
        (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

fn tag_slug(tag: &str) -> String {
    tag.trim()
        .trim_start_matches('#')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn tags_line(tags: &[String]) -> Option<String> {
    let slugs: Vec<String> = tags
        .iter()
        .map(|t| tag_slug(t))
        .filter(|t| !t.is_empty())
        .collect();
    if slugs.is_empty() {
        return None;
    }
    Some(format!("[{}]", slugs.join(", ")))
}

pub fn coordinates_line(location: &Location) -> Option<String> {
    Some(format!("{}, {}", location.latitude?, location.longitude?))
}

pub fn location_line(location: &Location) -> Option<String> {
    let parts: Vec<&str> = [
        &location.place_name,
        &location.locality_name,
        &location.administrative_area,
        &location.country,
    ]
    .into_iter()
    .filter_map(non_empty)
    .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub fn render_frontmatter(entry: &Entry, local: &DateTime<Tz>) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("date: {}\n", frontmatter_stamp(local)));
    if let Some(weather) = entry.weather.as_ref().and_then(weather_line) {
        out.push_str(&format!("weather: {weather}\n"));
    }
    if let Some(tags) = tags_line(&entry.tags) {
        out.push_str(&format!("tags: {tags}\n"));
    }
    if let Some(coordinates) = entry.location.as_ref().and_then(coordinates_line) {
        out.push_str(&format!("coordinates: {coordinates}\n"));
    }
    out.push_str("locations: \n");
    out.push_str("---\n");
    out
}

/// Frontmatter, the already rewritten body, then the metadata footer.
pub fn render_document(entry: &Entry, local: &DateTime<Tz>, body: &str) -> String {
    let mut out = render_frontmatter(entry, local);
    out.push_str(body);
    out.push_str("\n\n---\n");
    if let Some(location) = entry.location.as_ref().and_then(location_line) {
        out.push_str(&location);
    }
    out
}
