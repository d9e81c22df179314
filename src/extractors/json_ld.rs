use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use scraper::Selector;
use serde_json::Value;

use crate::extractors::{ExtractError, ExtractionContext, Extractor};
use crate::model::ParsedRecipe;
use crate::parsers::recipe_from_value;

pub struct JsonLdExtractor;

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("Invalid JSON-LD selector")
});

static RECIPE_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""@type"\s*:\s*(?:\[[^\]]*)?"(?:https?://schema\.org/|schema:)?[Rr]ecipe""#)
        .expect("Invalid recipe marker regex")
});

static TRAILING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("Invalid trailing comma regex"));

fn sanitize_json(json_str: &str) -> String {
    let mut cleaned = json_str.trim().to_string();

    // Some pages prefix the payload with stray text
    if !cleaned.starts_with('{') && !cleaned.starts_with('[') {
        if let Some(start) = cleaned.find(['{', '[']) {
            cleaned = cleaned[start..].to_string();
        }
    }

    cleaned = cleaned.replace("<!--", "").replace("-->", "");
    // raw line breaks inside string literals are invalid JSON
    cleaned = cleaned.replace(['\n', '\r', '\t'], " ");
    TRAILING_COMMA_REGEX.replace_all(&cleaned, "$1").into_owned()
}

fn is_recipe_type(value: &Value) -> bool {
    let matches = |t: &str| {
        t.eq_ignore_ascii_case("Recipe")
            || t.rsplit(['/', ':']).next().is_some_and(|t| t.eq_ignore_ascii_case("Recipe"))
    };
    match value.get("@type") {
        Some(Value::String(t)) => matches(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Finds the recipe node in a root object, an array, or an `@graph`.
fn find_recipe_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe_node),
        Value::Object(obj) => {
            if is_recipe_type(value) {
                return Some(value);
            }
            ["@graph", "mainEntity"]
                .iter()
                .filter_map(|key| obj.get(*key))
                .find_map(find_recipe_node)
        }
        _ => None,
    }
}

fn recipe_scripts<'a>(context: &ExtractionContext<'a>) -> impl Iterator<Item = String> + 'a {
    context
        .document
        .select(&SCRIPT_SELECTOR)
        .map(|script| script.inner_html())
        .filter(|json| RECIPE_MARKER_REGEX.is_match(json))
}

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &str {
        "json-ld"
    }

    fn can_parse(&self, context: &ExtractionContext) -> bool {
        recipe_scripts(context).next().is_some()
    }

    fn parse(&self, context: &ExtractionContext) -> Result<ParsedRecipe, ExtractError> {
        // Try each script element until we find a valid recipe
        for script in recipe_scripts(context) {
            let json_ld = match serde_json::from_str::<Value>(&sanitize_json(&script)) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    warn!("Skipping undecodable JSON-LD block: {}", e);
                    continue;
                }
            };

            let Some(mut recipe) = find_recipe_node(&json_ld).and_then(recipe_from_value) else {
                debug!("JSON-LD block carries a Recipe marker but no recipe node");
                continue;
            };

            recipe.image_url = recipe.image_url.map(|img| context.resolve_url(&img));
            debug!(
                "Found JSON-LD recipe '{}' with {} ingredients",
                recipe.name,
                recipe.ingredients.len()
            );
            return Ok(recipe);
        }

        Err(ExtractError::NoRecipe)
    }
}
