//! Title formatting from a user-configurable template
//!
//! Substitutes `{show}`, `{date}`, `{date_iso}`, `{date_usa}`,
//! `{date_numeric}`, `{tour}` and `{master}` tokens in a template string.
//! Unknown values become the empty string, unrecognized tokens stay
//! verbatim, and the result is trimmed. Pure and deterministic: no clock,
//! no randomness.

use regex::Regex;

use super::encora::{EncoraDate, EncoraRecording};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The four template-visible renderings of a recording date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRenderings {
    /// Long form, e.g. "December 31, 2024"
    pub long: Option<String>,
    /// "2024-12-31"
    pub iso: Option<String>,
    /// "12-31-2024"
    pub usa: Option<String>,
    /// "31-12-2024"
    pub numeric: Option<String>,
}

/// Render the date variants for a recording.
///
/// Unknown month/day components are replaced by `replace_char` doubled.
/// A date variant tag and a matinee time each append an independent
/// parenthesized suffix to all four renderings.
pub fn render_date(date: Option<&EncoraDate>, replace_char: &str) -> DateRenderings {
    let Some(date) = date else {
        return DateRenderings::default();
    };
    let Some(full_date) = date.full_date.as_deref().filter(|d| !d.trim().is_empty()) else {
        return DateRenderings::default();
    };

    let replace = replace_char.chars().next().unwrap_or('x').to_string().repeat(2);

    let mut parts = full_date.split('-');
    let year = parts.next().unwrap_or_default().to_string();
    let month = parts
        .next()
        .filter(|_| date.month_known)
        .map(str::to_string)
        .unwrap_or_else(|| replace.clone());
    let day = parts
        .next()
        .filter(|_| date.day_known)
        .map(str::to_string)
        .unwrap_or_else(|| replace.clone());

    let month_num: Option<usize> = month.parse().ok().filter(|m| (1..=12).contains(m));
    let year_num: Option<i32> = year.parse().ok();

    let mut long = match (month_num, year_num) {
        (Some(m), Some(_)) if date.month_known && date.day_known && day.parse::<u32>().is_ok() => {
            format!("{} {}, {}", MONTHS[m - 1], day.parse::<u32>().unwrap(), year)
        }
        (Some(m), Some(_)) if date.month_known => {
            format!("{} {}, {}", MONTHS[m - 1], day, year)
        }
        (_, Some(_)) => year.clone(),
        _ => format!("{}-{}-{}", year, month, day),
    };
    let mut iso = format!("{}-{}-{}", year, month, day);
    let mut usa = format!("{}-{}-{}", month, day, year);
    let mut numeric = format!("{}-{}-{}", day, month, year);

    if let Some(variant) = date.date_variant.as_deref().filter(|v| !v.trim().is_empty()) {
        for rendering in [&mut long, &mut iso, &mut usa, &mut numeric] {
            rendering.push_str(&format!(" ({})", variant));
        }
    }

    if date
        .time
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case("matinee"))
    {
        for rendering in [&mut long, &mut iso, &mut usa, &mut numeric] {
            rendering.push_str(" (matinée)");
        }
    }

    DateRenderings {
        long: Some(long),
        iso: Some(iso),
        usa: Some(usa),
        numeric: Some(numeric),
    }
}

/// Format the item title from the configured template.
///
/// A path segment matching `Act <n>` appends ` Act <n>` to the show name
/// before substitution.
pub fn format_title(
    template: &str,
    recording: &EncoraRecording,
    media_path: &str,
    replace_char: &str,
) -> String {
    let dates = render_date(recording.date.as_ref(), replace_char);

    let mut show = recording.show.clone().unwrap_or_default();
    let act_re = Regex::new(r"(?i)Act\s*(\d+)").unwrap();
    if let Some(caps) = act_re.captures(media_path) {
        show = format!("{} Act {}", show, &caps[1]);
    }

    let variables: [(&str, Option<&str>); 7] = [
        ("{show}", Some(show.as_str())),
        ("{date}", dates.long.as_deref()),
        ("{date_iso}", dates.iso.as_deref()),
        ("{date_usa}", dates.usa.as_deref()),
        ("{date_numeric}", dates.numeric.as_deref()),
        ("{tour}", recording.tour.as_deref()),
        ("{master}", recording.master.as_deref()),
    ];

    let mut title = template.to_string();
    for (token, value) in variables {
        title = title.replace(token, value.unwrap_or_default());
    }

    title.trim().to_string()
}
