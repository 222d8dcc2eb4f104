//! Quantity extraction from free text
//!
//! Narrow string parsers used by the override engine. Each is a pure
//! string -> Option function so it can be unit-tested on its own.

/// Extract the first run of digits anywhere in the text
///
/// "2 eggs" -> Some(2), "fried 3 rotis" -> Some(3), "toast" -> None
pub fn leading_count(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && !bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == bytes.len() {
        return None;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    text[start..i].parse().ok()
}

/// Extract a digit run immediately preceding a keyword occurrence
///
/// "3 scoops whey" with keyword "scoop" -> Some(3). Only whitespace may
/// separate the digits from the keyword.
pub fn count_before_keyword(text: &str, keyword: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find(keyword) {
        let at = search_from + pos;
        let before = lower[..at].trim_end();
        let bytes = before.as_bytes();
        let mut i = bytes.len();
        while i > 0 && bytes[i - 1].is_ascii_digit() {
            i -= 1;
        }
        if i < bytes.len() {
            if let Ok(n) = before[i..].parse() {
                return Some(n);
            }
        }
        search_from = at + keyword.len();
    }
    None
}

/// Extract a gram amount written inline, e.g. "5g butter" or "butter 10 g"
///
/// Matches a digit run (with optional decimal part) followed by a gram
/// unit word at a word boundary. Does not match "2 eggs" or "1lb".
pub fn grams_in_text(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        // Optional fractional part
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let number_end = i;

        // At most one space between the number and the unit
        let mut unit_start = number_end;
        if unit_start < bytes.len() && bytes[unit_start] == b' ' {
            unit_start += 1;
        }

        for unit in ["grams", "gram", "gms", "gm", "g"] {
            let unit_end = unit_start + unit.len();
            if lower.get(unit_start..unit_end) == Some(unit) {
                // Word boundary after the unit
                let boundary = lower
                    .get(unit_end..)
                    .and_then(|rest| rest.chars().next())
                    .map_or(true, |c| !c.is_alphabetic());
                if boundary {
                    return lower[start..number_end].parse().ok();
                }
            }
        }
    }

    None
}
