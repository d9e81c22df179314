use crate::error::ParseError;
use crate::model::{ParsedRecipe, ParserContext};

mod json;
mod meal_master;
mod plain_text;
mod vendor;
mod web;
mod xml;

pub use self::json::{recipe_from_value, JsonRecipeParser};
pub use self::meal_master::MealMasterParser;
pub use self::plain_text::{classify_line, LineKind, PlainTextParser, SectionState};
pub use self::vendor::{VendorJsonParser, VendorSpec, MEALIE, PAPRIKA, VENDORS};
pub use self::web::{SiteSpec, WebRecipeParser, DEFAULT_SITES};
pub use self::xml::XmlRecipeParser;

/// Title used when neither the content nor the context names the recipe.
pub const DEFAULT_FALLBACK_TITLE: &str = "Untitled Recipe";

/// Detection priority. The registry tries tiers in ascending order, so a
/// parser that recognizes a narrow marker always wins over a broader one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetectionTier {
    /// Vendor exports, site-specific scrapers, marker-delimited legacy files
    Specific,
    /// Self-describing documents (JSON, XML)
    Structured,
    /// Any HTML page
    Markup,
    /// Accepts anything non-empty
    Fallback,
}

pub trait RecipeParser: Send + Sync {
    /// Stable parser identifier, used for direct lookup
    fn name(&self) -> &str;

    /// Label of the source this parser reads (e.g. "mealmaster", "allrecipes")
    fn source_type(&self) -> &str;

    fn tier(&self) -> DetectionTier;

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool;

    fn parse(&self, content: &str, context: &ParserContext)
        -> Result<Vec<ParsedRecipe>, ParseError>;
}

/// Removes a leading list marker: `1.`, `2)`, `Step 3:`, `-`, `*`, `•`.
pub(crate) fn strip_list_marker(line: &str) -> &str {
    use regex::Regex;
    use std::sync::LazyLock;

    static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*(?:(?i:step)\s*\d+\s*[:.)-]?\s*|\d+\s*[.)](?:\s+|$)|[-*•·▪]+\s*)")
            .expect("Invalid list marker regex")
    });

    match LIST_MARKER_REGEX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Splits a blob of items on newlines, dropping blank lines and list markers.
pub(crate) fn split_blob_lines(blob: &str) -> Vec<String> {
    blob.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
