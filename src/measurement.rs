//! Measurement grammar.
//!
//! Splits a raw ingredient fragment such as `"2 1/2 cups flour, sifted"` into
//! quantity, unit, ingredient name and preparation phrase, and reads cooking
//! durations, temperatures and yields out of free text. Every function here is
//! pure and total: any input yields a value, never a panic.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ParsedIngredient, ParsedInstruction, TemperatureUnit};

/// Canonical unit followed by every alias that normalizes to it (lowercase,
/// without trailing period). Meal-Master two-letter codes are included.
const UNIT_ALIASES: &[(&str, &[&str])] = &[
    ("tsp", &["ts", "tsp", "tsps", "teaspoon", "teaspoons"]),
    ("tbsp", &["tb", "tbs", "tbl", "tbsp", "tbsps", "tablespoon", "tablespoons"]),
    ("cup", &["c", "cup", "cups"]),
    ("fl oz", &["fl", "floz", "fl oz"]),
    ("pt", &["pt", "pts", "pint", "pints"]),
    ("qt", &["qt", "qts", "quart", "quarts"]),
    ("gal", &["ga", "gal", "gals", "gallon", "gallons"]),
    ("ml", &["ml", "mls", "milliliter", "milliliters", "millilitre", "millilitres"]),
    ("l", &["l", "liter", "liters", "litre", "litres"]),
    ("oz", &["oz", "ounce", "ounces"]),
    ("lb", &["lb", "lbs", "pound", "pounds"]),
    ("g", &["g", "gr", "gram", "grams", "gramme", "grammes"]),
    ("kg", &["kg", "kgs", "kilogram", "kilograms"]),
    ("mg", &["mg", "milligram", "milligrams"]),
    ("pinch", &["pn", "pinch", "pinches"]),
    ("dash", &["ds", "dash", "dashes"]),
    ("drop", &["dr", "drop", "drops"]),
    ("can", &["cn", "can", "cans"]),
    ("package", &["pk", "pkg", "pkgs", "package", "packages"]),
    ("clove", &["cl", "clove", "cloves"]),
    ("slice", &["sl", "slice", "slices"]),
    ("bunch", &["bn", "bunch", "bunches"]),
    ("sprig", &["sprig", "sprigs"]),
    ("stick", &["stick", "sticks"]),
    ("stalk", &["stalk", "stalks"]),
    ("head", &["head", "heads"]),
    ("jar", &["jar", "jars"]),
    ("bottle", &["bottle", "bottles"]),
    ("handful", &["handful", "handfuls"]),
    ("piece", &["pc", "pcs", "piece", "pieces"]),
    ("each", &["ea", "each"]),
    ("large", &["lg", "large"]),
    ("medium", &["md", "medium"]),
    ("small", &["sm", "small"]),
];

const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

static LEADING_QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+(?:\.\d+)?(?:\s*[-–]\s*|\s+to\s+)\d+(?:\.\d+)?|\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?|\.\d+)(?:\s+|$|[^\d/.\s])",
    )
    .expect("Invalid leading quantity regex")
});

static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(?:\s*[-–]\s*|\s+to\s+)(\d+(?:\.\d+)?)$")
        .expect("Invalid range regex")
});

static MIXED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("Invalid mixed number regex"));

static FRACTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("Invalid fraction regex"));

static TRAILING_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\(([^()]*)\)\s*$").expect("Invalid trailing parenthetical regex")
});

static PREP_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.+?)\s+((?:(?:finely|roughly|coarsely|thinly|freshly|lightly|very|well)\s+)?(?:diced|minced|chopped|sliced|melted|softened|grated|shredded|crushed|cubed|peeled|julienned|beaten|sifted|halved|quartered|drained|rinsed|toasted|mashed|trimmed|zested|juiced|crumbled|divided|cooked|thawed|seeded|pitted))$",
    )
    .expect("Invalid preparation suffix regex")
});

static OPTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*optional\s*\)|\boptional\b").expect("Invalid optional regex")
});

static PARENTHETICAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("Invalid parenthetical regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static HOURS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?(?:\s*[-–]\s*\d+(?:\.\d+)?)?)\s*(?:hours?|hrs?|h)\b",
    )
    .expect("Invalid hours regex")
});

static MINUTES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\s*[-–]\s*\d+)?)\s*(?:minutes?|mins?|m)\b")
        .expect("Invalid minutes regex")
});

static INTEGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid integer regex"));

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)";
    Regex::new(&format!(
        r"(?i)^P(?:{number}D)?(?:T(?:{number}H)?(?:{number}M)?(?:{number}S)?)?$"
    ))
    .expect("Invalid ISO-8601 duration regex")
});

static TEMPERATURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{2,3})\s*(?:°|º|˚|degrees?\b)?\s*(fahrenheit|celsius|f|c)\b")
        .expect("Invalid temperature regex")
});

static MARKED_TEMPERATURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{2,3})\s*(?:°|º|˚|degrees?\b)\s*(?:(fahrenheit|celsius|f|c)\b)?")
        .expect("Invalid marked temperature regex")
});

static GLUED_TEMPERATURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{2,3})\s?([FC])\b").expect("Invalid glued temperature regex")
});

/// Components of one ingredient fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientParts {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub name: String,
    pub preparation: Option<String>,
    pub notes: Option<String>,
    pub is_optional: bool,
}

/// Name and trailing phrases left after quantity and unit removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparationSplit {
    pub name: String,
    pub preparation: Option<String>,
    pub notes: Option<String>,
    pub is_optional: bool,
}

/// Rewrites unicode vulgar fractions as ASCII fractions, separating them from
/// a preceding whole number (`1½` becomes `1 1/2`).
pub fn expand_vulgar_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        match VULGAR_FRACTIONS.iter().find(|(f, _)| *f == c) {
            Some((_, ascii)) => {
                if prev.is_some_and(|p| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
        prev = Some(c);
    }
    out
}

/// Value of a complete quantity expression.
///
/// Ranges reduce to their mean, mixed numbers to `whole + num/den`, anything
/// else that parses as a finite decimal is used as-is.
pub fn parse_quantity(text: &str) -> Option<f64> {
    let expanded = expand_vulgar_fractions(text.trim());
    let expr = expanded.trim();
    if expr.is_empty() {
        return None;
    }

    if let Some(caps) = RANGE_REGEX.captures(expr) {
        let low: f64 = caps[1].parse().ok()?;
        let high: f64 = caps[2].parse().ok()?;
        return Some((low + high) / 2.0);
    }

    if let Some(caps) = MIXED_REGEX.captures(expr) {
        let whole: f64 = caps[1].parse().ok()?;
        return fraction_value(&caps[2], &caps[3]).map(|frac| whole + frac);
    }

    if let Some(caps) = FRACTION_REGEX.captures(expr) {
        return fraction_value(&caps[1], &caps[2]);
    }

    expr.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn fraction_value(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Removes a leading quantity expression.
///
/// Returns the quantity and the remaining text. When no quantity can be read
/// the whole (trimmed) input is returned as the remainder.
pub fn split_quantity(text: &str) -> (Option<f64>, String) {
    let expanded = expand_vulgar_fractions(text.trim());
    let Some(caps) = LEADING_QUANTITY_REGEX.captures(&expanded) else {
        return (None, expanded);
    };

    let expr = caps.get(1).map_or("", |m| m.as_str());
    match parse_quantity(expr) {
        Some(quantity) => {
            let rest = expanded[expr.len()..].trim_start().to_string();
            (Some(quantity), rest)
        }
        None => (None, expanded),
    }
}

/// Canonical form of a unit token, if it is a known unit.
pub fn canonical_unit(token: &str) -> Option<&'static str> {
    let key = token.trim().trim_end_matches('.').trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    UNIT_ALIASES
        .iter()
        .find(|(canonical, aliases)| *canonical == key || aliases.contains(&key.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Normalizes a unit token; unknown tokens pass through unchanged.
pub fn normalize_unit(token: &str) -> String {
    let trimmed = token.trim();
    canonical_unit(trimmed)
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}

/// Removes a leading unit token when it is a known unit.
pub fn split_unit(text: &str) -> (Option<String>, String) {
    let text = text.trim_start();
    let mut tokens = text.splitn(3, char::is_whitespace);
    let first = tokens.next().unwrap_or("");
    let second = tokens.next().unwrap_or("");

    // "fl oz" is the only two-token unit we accept
    if first.trim_end_matches('.').eq_ignore_ascii_case("fl")
        && second.trim_end_matches('.').eq_ignore_ascii_case("oz")
    {
        let rest = tokens.next().unwrap_or("").trim_start().to_string();
        return (Some("fl oz".to_string()), rest);
    }

    match canonical_unit(first) {
        Some(unit) => {
            let rest = text[first.len()..].trim_start().to_string();
            (Some(unit.to_string()), rest)
        }
        None => (None, text.to_string()),
    }
}

/// Byte offset of the first comma outside any parentheses.
pub fn top_level_comma(text: &str) -> Option<usize> {
    let mut depth: usize = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

fn tidy_phrase(text: &str) -> Option<String> {
    let cleaned = collapse_whitespace(text);
    let cleaned = cleaned
        .trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Splits a preparation phrase off an ingredient name.
///
/// Tried in order: text after the first top-level comma, a trailing
/// parenthetical, a known preparation-verb suffix.
pub fn split_preparation(text: &str) -> PreparationSplit {
    let text = text.trim();

    let (mut name, mut preparation) = if let Some(idx) = top_level_comma(text) {
        (text[..idx].to_string(), tidy_phrase(&text[idx + 1..]))
    } else if let Some(caps) = TRAILING_PAREN_REGEX.captures(text) {
        (caps[1].to_string(), tidy_phrase(&caps[2]))
    } else if let Some(caps) = PREP_SUFFIX_REGEX.captures(text) {
        (caps[1].to_string(), tidy_phrase(&caps[2]))
    } else {
        (text.to_string(), None)
    };

    let mut is_optional = false;
    if let Some(prep) = preparation.as_deref() {
        if OPTIONAL_REGEX.is_match(prep) {
            is_optional = true;
            preparation = tidy_phrase(&OPTIONAL_REGEX.replace_all(prep, ""));
        }
    }
    if OPTIONAL_REGEX.is_match(&name) && tidy_phrase(&OPTIONAL_REGEX.replace_all(&name, "")).is_some() {
        is_optional = true;
        name = OPTIONAL_REGEX.replace_all(&name, "").into_owned();
    }

    let notes = PARENTHETICAL_REGEX
        .captures_iter(&name)
        .filter_map(|caps| tidy_phrase(&caps[1]))
        .collect::<Vec<_>>();
    let notes = if notes.is_empty() {
        None
    } else {
        name = PARENTHETICAL_REGEX.replace_all(&name, " ").into_owned();
        Some(notes.join("; "))
    };

    PreparationSplit {
        name: tidy_phrase(&name).unwrap_or_default(),
        preparation,
        notes,
        is_optional,
    }
}

/// Runs the full grammar over one ingredient fragment.
pub fn parse_ingredient_parts(text: &str) -> IngredientParts {
    let (quantity, rest) = split_quantity(text);
    let (unit, rest) = if quantity.is_some() {
        split_unit(&rest)
    } else {
        (None, rest)
    };
    let split = split_preparation(&rest);

    IngredientParts {
        quantity,
        unit,
        name: split.name,
        preparation: split.preparation,
        notes: split.notes,
        is_optional: split.is_optional,
    }
}

/// Builds a canonical ingredient from one source line.
pub fn parse_ingredient(text: &str, order: i32, section_name: Option<&str>) -> ParsedIngredient {
    let parts = parse_ingredient_parts(text);
    let ingredient_name = if parts.name.is_empty() {
        collapse_whitespace(text)
    } else {
        parts.name
    };

    ParsedIngredient {
        order,
        section_name: section_name.map(str::to_string),
        quantity: parts.quantity,
        unit: parts.unit,
        ingredient_name,
        preparation: parts.preparation,
        notes: parts.notes,
        is_optional: parts.is_optional,
        original_text: text.to_string(),
    }
}

/// Minutes in an ISO-8601 duration such as `PT1H30M` or `P0DT20M`.
pub fn parse_iso8601_duration(text: &str) -> Option<i32> {
    let caps = ISO_DURATION_REGEX.captures(text.trim())?;
    let component = |idx: usize| caps.get(idx).and_then(|m| parse_quantity(m.as_str()));

    let days = component(1);
    let hours = component(2);
    let minutes = component(3);
    let seconds = component(4);
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    let total = days.unwrap_or(0.0) * 1440.0
        + hours.unwrap_or(0.0) * 60.0
        + minutes.unwrap_or(0.0)
        + seconds.unwrap_or(0.0) / 60.0;
    Some(total.round() as i32)
}

/// Explicit `<n> hours` / `<n> minutes` mentions, summed.
pub fn scan_duration(text: &str) -> Option<i32> {
    let mut total = 0.0;
    let mut found = false;

    for caps in HOURS_REGEX.captures_iter(text) {
        if let Some(hours) = parse_quantity(&caps[1]) {
            total += hours * 60.0;
            found = true;
        }
    }
    for caps in MINUTES_REGEX.captures_iter(text) {
        if let Some(minutes) = parse_quantity(&caps[1]) {
            total += minutes;
            found = true;
        }
    }

    found.then(|| total.round() as i32)
}

/// Minutes described by a free-text duration field.
///
/// Accepts ISO-8601, hour/minute phrases (summed), and finally a bare integer
/// taken as minutes.
pub fn parse_duration_minutes(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.starts_with(['P', 'p']) {
        if let Some(minutes) = parse_iso8601_duration(text) {
            return Some(minutes);
        }
    }
    scan_duration(text).or_else(|| first_integer(text))
}

fn first_integer(text: &str) -> Option<i32> {
    INTEGER_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

fn temperature_unit(token: &str) -> TemperatureUnit {
    if token.to_lowercase().starts_with('c') {
        TemperatureUnit::C
    } else {
        TemperatureUnit::F
    }
}

fn default_unit_for(value: i32) -> TemperatureUnit {
    if (100..=600).contains(&value) {
        TemperatureUnit::F
    } else {
        TemperatureUnit::C
    }
}

/// Temperature in a dedicated field such as `"350°F"`, `"180 C"` or `"375"`.
///
/// A bare integer is accepted only within 100..=600 and read as Fahrenheit.
pub fn parse_temperature(text: &str) -> Option<(i32, TemperatureUnit)> {
    if let Some(caps) = TEMPERATURE_REGEX.captures(text) {
        let value = caps[1].parse::<i32>().ok()?;
        return Some((value, temperature_unit(&caps[2])));
    }

    let value = first_integer(text)?;
    (100..=600)
        .contains(&value)
        .then_some((value, TemperatureUnit::F))
}

/// Temperature mentioned inside instruction prose. Requires a degree marker or
/// an uppercase `F`/`C` directly after the number.
pub fn scan_temperature(text: &str) -> Option<(i32, TemperatureUnit)> {
    if let Some(caps) = MARKED_TEMPERATURE_REGEX.captures(text) {
        let value = caps[1].parse::<i32>().ok()?;
        let unit = caps
            .get(2)
            .map(|m| temperature_unit(m.as_str()))
            .unwrap_or_else(|| default_unit_for(value));
        return Some((value, unit));
    }

    let caps = GLUED_TEMPERATURE_REGEX.captures(text)?;
    let value = caps[1].parse::<i32>().ok()?;
    Some((value, temperature_unit(&caps[2])))
}

/// First positive integer in a yield phrase (`"Serves 4-6"` gives 4).
pub fn parse_servings(text: &str) -> Option<i32> {
    first_integer(text).filter(|servings| *servings > 0)
}

/// Builds a canonical instruction, reading explicit time and temperature
/// mentions out of the text.
pub fn parse_instruction(text: &str, step_number: i32, section_name: Option<&str>) -> ParsedInstruction {
    let instruction_text = collapse_whitespace(text);
    let temperature = scan_temperature(&instruction_text);

    ParsedInstruction {
        step_number,
        section_name: section_name.map(str::to_string),
        time_minutes: scan_duration(&instruction_text),
        temperature: temperature.map(|(value, _)| value),
        temperature_unit: temperature.map(|(_, unit)| unit),
        instruction_text,
    }
}
