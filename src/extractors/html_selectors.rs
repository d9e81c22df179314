use crate::extractors::{ExtractError, ExtractionContext, Extractor};
use crate::measurement::{parse_duration_minutes, parse_ingredient, parse_instruction, parse_servings};
use crate::model::ParsedRecipe;
use crate::parsers::strip_list_marker;
use html_escape::decode_html_entities;
use log::debug;
use scraper::{ElementRef, Selector};

/// Heuristic extraction from Microdata attributes and recipe-card plugin markup.
pub struct HtmlSelectorExtractor;

/// Longest text accepted for a single-value field, to avoid grabbing a page
const MAX_FIELD_LEN: usize = 5000;

// Microdata first, then WordPress recipe-card plugins, then generic markup
const TITLE_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Recipe'] [itemprop='name']",
    ".wprm-recipe-name",
    ".tasty-recipes-title",
    ".mv-create-title",
    ".recipe-card-title",
    ".recipe-title",
    ".recipe-name",
    "h1",
    "meta[property='og:title']",
    "title",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Recipe'] [itemprop='description']",
    ".wprm-recipe-summary",
    ".tasty-recipes-description",
    ".mv-create-description",
    ".recipe-summary",
    ".recipe-description",
    "meta[property='og:description']",
    "meta[name='description']",
];

const INGREDIENT_SELECTORS: &[&str] = &[
    "[itemprop='recipeIngredient']",
    "[itemprop='ingredients']",
    ".wprm-recipe-ingredient",
    ".tasty-recipes-ingredients li",
    ".mv-create-ingredients li",
    ".recipe-card-ingredients li",
    ".recipe-ingredients li",
    ".ingredients li",
    ".ingredient-list li",
];

const INSTRUCTION_SELECTORS: &[&str] = &[
    "[itemprop='recipeInstructions'] li",
    "[itemprop='recipeInstructions'] p",
    "[itemprop='recipeInstructions']",
    ".wprm-recipe-instruction-text",
    ".tasty-recipes-instructions li",
    ".mv-create-instructions li",
    ".recipe-card-instructions li",
    ".recipe-instructions li",
    ".recipe-directions li",
    ".instructions li",
    ".directions li",
];

const IMAGE_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Recipe'] [itemprop='image']",
    ".wprm-recipe-image img",
    ".tasty-recipes-image img",
    ".recipe-card-image img",
    "meta[property='og:image']",
];

const PREP_TIME_SELECTORS: &[&str] = &[
    "[itemprop='prepTime']",
    ".wprm-recipe-prep_time-container",
    ".tasty-recipes-prep-time",
    ".recipe-prep-time",
    ".prep-time",
];

const COOK_TIME_SELECTORS: &[&str] = &[
    "[itemprop='cookTime']",
    ".wprm-recipe-cook_time-container",
    ".tasty-recipes-cook-time",
    ".recipe-cook-time",
    ".cook-time",
];

const TOTAL_TIME_SELECTORS: &[&str] = &[
    "[itemprop='totalTime']",
    ".wprm-recipe-total_time-container",
    ".tasty-recipes-total-time",
    ".recipe-total-time",
    ".total-time",
];

const YIELD_SELECTORS: &[&str] = &[
    "[itemprop='recipeYield']",
    ".wprm-recipe-servings",
    ".tasty-recipes-yield",
    ".mv-create-yield",
    ".recipe-yield",
    ".recipe-servings",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Recipe'] [itemprop='author']",
    ".wprm-recipe-author",
    ".tasty-recipes-author-name",
    ".recipe-author",
];

fn collapse(text: &str) -> String {
    decode_html_entities(&text.split_whitespace().collect::<Vec<_>>().join(" ")).into_owned()
}

/// Machine-readable value when the element carries one, else its text.
fn element_value(element: &ElementRef) -> String {
    let el = element.value();
    let attr = match el.name() {
        "meta" => el.attr("content"),
        "img" => el.attr("src").or_else(|| el.attr("data-src")),
        "link" | "a" if el.attr("itemprop").is_some() => el.attr("href"),
        "time" => el.attr("datetime"),
        _ => el.attr("content"),
    };
    match attr {
        Some(value) if !value.trim().is_empty() => collapse(value),
        _ => collapse(&element.text().collect::<Vec<_>>().join(" ")),
    }
}

fn find_first(context: &ExtractionContext, field: &str, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let found = context
            .document
            .select(&selector)
            .map(|el| element_value(&el))
            .find(|text| !text.is_empty() && text.len() < MAX_FIELD_LEN);
        if let Some(text) = found {
            debug!("Found {} using selector: {}", field, selector_str);
            return Some(text);
        }
    }
    None
}

fn find_items(context: &ExtractionContext, field: &str, selectors: &[&str]) -> Vec<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let items: Vec<String> = context
            .document
            .select(&selector)
            .map(|el| collapse(&el.text().collect::<Vec<_>>().join(" ")))
            .map(|text| strip_list_marker(&text).to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if !items.is_empty() {
            debug!("Found {} {} using selector: {}", items.len(), field, selector_str);
            return items;
        }
    }
    Vec::new()
}

impl Extractor for HtmlSelectorExtractor {
    fn name(&self) -> &str {
        "html-selectors"
    }

    fn can_parse(&self, context: &ExtractionContext) -> bool {
        !find_items(context, "ingredients", INGREDIENT_SELECTORS).is_empty()
            || !find_items(context, "instructions", INSTRUCTION_SELECTORS).is_empty()
    }

    fn parse(&self, context: &ExtractionContext) -> Result<ParsedRecipe, ExtractError> {
        debug!("Attempting to extract recipe using HTML selectors");

        let ingredients = find_items(context, "ingredients", INGREDIENT_SELECTORS);
        let instructions = find_items(context, "instructions", INSTRUCTION_SELECTORS);
        if ingredients.is_empty() && instructions.is_empty() {
            return Err(ExtractError::NoContent);
        }

        let recipe = ParsedRecipe {
            name: find_first(context, "title", TITLE_SELECTORS).unwrap_or_default(),
            description: find_first(context, "description", DESCRIPTION_SELECTORS),
            author: find_first(context, "author", AUTHOR_SELECTORS),
            prep_time_minutes: find_first(context, "prep time", PREP_TIME_SELECTORS)
                .and_then(|t| parse_duration_minutes(&t)),
            cook_time_minutes: find_first(context, "cook time", COOK_TIME_SELECTORS)
                .and_then(|t| parse_duration_minutes(&t)),
            total_time_minutes: find_first(context, "total time", TOTAL_TIME_SELECTORS)
                .and_then(|t| parse_duration_minutes(&t)),
            servings: find_first(context, "yield", YIELD_SELECTORS).and_then(|s| parse_servings(&s)),
            image_url: find_first(context, "image", IMAGE_SELECTORS).map(|img| context.resolve_url(&img)),
            ingredients: ingredients
                .iter()
                .enumerate()
                .map(|(i, line)| parse_ingredient(line, i as i32 + 1, None))
                .collect(),
            instructions: instructions
                .iter()
                .enumerate()
                .map(|(i, step)| parse_instruction(step, i as i32 + 1, None))
                .collect(),
            ..Default::default()
        };

        debug!("Recipe name: {}", recipe.name);
        debug!("Ingredients count: {}", recipe.ingredients.len());
        debug!("Instructions count: {}", recipe.instructions.len());
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;
    use url::Url;

    fn extract(html: &str, base: Option<&Url>) -> Result<ParsedRecipe, ExtractError> {
        let document = Html::parse_document(html);
        HtmlSelectorExtractor.parse(&ExtractionContext::new(&document, base))
    }

    #[test]
    fn test_microdata() {
        let html = r#"
            <html><body>
            <div itemscope itemtype="https://schema.org/Recipe">
              <h2 itemprop="name">Banana Bread</h2>
              <img itemprop="image" src="/img/bread.jpg">
              <meta itemprop="prepTime" content="PT15M">
              <time itemprop="cookTime" datetime="PT1H">1 hour</time>
              <span itemprop="recipeYield">1 loaf (10 slices)</span>
              <ul>
                <li itemprop="recipeIngredient">3 ripe bananas, mashed</li>
                <li itemprop="recipeIngredient">1/3 cup melted butter</li>
              </ul>
              <ol itemprop="recipeInstructions">
                <li>Preheat the oven to 350°F.</li>
                <li>Mix everything and bake for 60 minutes.</li>
              </ol>
            </div>
            </body></html>
        "#;
        let base = Url::parse("https://bakery.example/banana-bread").unwrap();
        let recipe = extract(html, Some(&base)).unwrap();

        assert_eq!(recipe.name, "Banana Bread");
        assert_eq!(recipe.image_url.as_deref(), Some("https://bakery.example/img/bread.jpg"));
        assert_eq!(recipe.prep_time_minutes, Some(15));
        assert_eq!(recipe.cook_time_minutes, Some(60));
        assert_eq!(recipe.servings, Some(1));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].preparation.as_deref(), Some("mashed"));
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.instructions[0].temperature, Some(350));
    }

    #[test]
    fn test_wordpress_recipe_card() {
        let html = r#"
            <html><head>
              <meta property="og:image" content="https://blog.example/soup.jpg">
            </head><body>
            <h1>My Blog</h1>
            <div class="wprm-recipe">
              <h2 class="wprm-recipe-name">Tomato Soup</h2>
              <div class="wprm-recipe-summary">Cozy &amp; quick.</div>
              <span class="wprm-recipe-servings">4</span>
              <ul>
                <li class="wprm-recipe-ingredient">2 tbsp olive oil</li>
                <li class="wprm-recipe-ingredient">1 onion, diced</li>
              </ul>
              <div class="wprm-recipe-instruction-text">Soften the onion in the oil.</div>
              <div class="wprm-recipe-instruction-text">Add tomatoes and simmer 20 minutes.</div>
            </div>
            </body></html>
        "#;
        let recipe = extract(html, None).unwrap();

        assert_eq!(recipe.name, "Tomato Soup");
        assert_eq!(recipe.description.as_deref(), Some("Cozy & quick."));
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.image_url.as_deref(), Some("https://blog.example/soup.jpg"));
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("tbsp"));
        assert_eq!(recipe.instructions[1].time_minutes, Some(20));
    }

    #[test]
    fn test_no_recipe_markup() {
        let result = extract("<html><body><h1>About us</h1><p>Hello</p></body></html>", None);
        assert!(matches!(result, Err(ExtractError::NoContent)));
    }
}
