//! Weather intent detection
//!
//! A substring heuristic rather than real language understanding: a query
//! that mentions "weather" and contains " in " names the city after the
//! first " in ". Queries like "interest in weather patterns" match too.

const WEATHER_KEYWORD: &str = "weather";
const LOCATION_MARKER: &str = " in ";

/// Extract the city a weather question asks about, if any
pub fn detect_weather_city(query: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    if !lowered.contains(WEATHER_KEYWORD) {
        return None;
    }

    let (_, after) = lowered.split_once(LOCATION_MARKER)?;
    let clause = after.split(['?', '.']).next().unwrap_or_default().trim();
    let city = title_case(clause);

    if city.is_empty() {
        None
    } else {
        tracing::debug!(city = %city, "Weather intent detected");
        Some(city)
    }
}

/// Upper-case the first letter of every run of cased letters, lower-case the rest.
/// Uncased letters (CJK, digits, punctuation) all end a word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_lowercase() || c.is_uppercase() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
