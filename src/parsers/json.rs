//! Generic structured-object format.
//!
//! Reads a recipe object (or an array of them) whose field names vary by
//! producer. Every logical field is resolved through an ordered alias list, so
//! the same code reads hand-written JSON, app exports and Schema.org JSON-LD.

use html_escape::decode_html_entities;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{split_blob_lines, strip_list_marker, DetectionTier, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::measurement::{
    normalize_unit, parse_duration_minutes, parse_ingredient, parse_ingredient_parts,
    parse_instruction, parse_quantity, parse_servings,
};
use crate::model::{ParsedIngredient, ParsedInstruction, ParsedRecipe, ParserContext};

const NAME_KEYS: &[&str] = &["name", "title", "recipeName", "recipe_name", "recipeTitle"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary", "intro", "headnote"];
const AUTHOR_KEYS: &[&str] = &["author", "creator", "chef", "createdBy", "created_by"];
const SOURCE_KEYS: &[&str] = &["source", "publisher", "sourceName", "source_name", "site"];
const SOURCE_URL_KEYS: &[&str] = &[
    "sourceUrl",
    "source_url",
    "url",
    "link",
    "org_url",
    "originalUrl",
];
const PREP_TIME_KEYS: &[&str] = &[
    "prepTime",
    "prep_time",
    "prepTimeMinutes",
    "preparationTime",
    "preparation_time",
];
const COOK_TIME_KEYS: &[&str] = &[
    "cookTime",
    "cook_time",
    "cookTimeMinutes",
    "cookingTime",
    "cooking_time",
    "performTime",
    "perform_time",
];
const TOTAL_TIME_KEYS: &[&str] = &[
    "totalTime",
    "total_time",
    "totalTimeMinutes",
    "readyInMinutes",
];
const SERVINGS_KEYS: &[&str] = &[
    "servings",
    "recipeYield",
    "recipe_yield",
    "yield",
    "serves",
    "portions",
];
const INGREDIENTS_KEYS: &[&str] = &[
    "ingredients",
    "recipeIngredient",
    "recipeIngredients",
    "recipe_ingredient",
    "ingredientLines",
    "extendedIngredients",
];
const INSTRUCTIONS_KEYS: &[&str] = &[
    "instructions",
    "recipeInstructions",
    "recipe_instructions",
    "directions",
    "steps",
    "method",
];
const TAGS_KEYS: &[&str] = &["tags", "keywords"];
const CATEGORIES_KEYS: &[&str] = &[
    "categories",
    "category",
    "recipeCategory",
    "recipe_category",
    "course",
];
const IMAGE_KEYS: &[&str] = &[
    "image",
    "imageUrl",
    "image_url",
    "photo",
    "photoUrl",
    "photo_url",
    "thumbnailUrl",
];
const CUISINE_KEYS: &[&str] = &["cuisine", "recipeCuisine", "recipe_cuisine"];
const NOTES_KEYS: &[&str] = &["notes", "note"];

const WRAPPER_KEYS: &[&str] = &["recipes", "items", "data"];

// Keys of a structured ingredient object
const ING_RAW_KEYS: &[&str] = &["originalText", "original_text", "text", "raw", "line", "display"];
const ING_NAME_KEYS: &[&str] = &["name", "ingredientName", "ingredient", "food", "item", "product"];
const ING_QUANTITY_KEYS: &[&str] = &["quantity", "qty", "amount"];
const ING_UNIT_KEYS: &[&str] = &["unit", "units", "measure", "unitName"];
const ING_PREP_KEYS: &[&str] = &["preparation", "prep", "preparationNotes", "style"];
const ING_NOTES_KEYS: &[&str] = &["notes", "note", "comment"];
const ING_OPTIONAL_KEYS: &[&str] = &["optional", "isOptional", "is_optional"];
const ING_SECTION_KEYS: &[&str] = &["section", "sectionName", "group"];

const STEP_TEXT_KEYS: &[&str] = &["text", "instruction", "step", "description", "name"];
const SECTION_ITEMS_KEYS: &[&str] = &["itemListElement", "steps", "instructions", "items"];
const INGREDIENT_GROUP_KEYS: &[&str] = &["ingredients", "items"];

pub struct JsonRecipeParser {
    fallback_title: String,
}

impl Default for JsonRecipeParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TITLE)
    }
}

impl JsonRecipeParser {
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            fallback_title: fallback_title.into(),
        }
    }

    /// Converts every recipe object in an already decoded document.
    pub fn parse_value(
        &self,
        value: &Value,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let objects = recipe_objects(value)?;
        debug!("JsonRecipeParser: found {} recipe object(s)", objects.len());

        Ok(objects
            .into_iter()
            .map(|obj| recipe_from_map(obj).finalize(context, &self.fallback_title))
            .collect())
    }
}

impl RecipeParser for JsonRecipeParser {
    fn name(&self) -> &str {
        "json"
    }

    fn source_type(&self) -> &str {
        "json"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::Structured
    }

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool {
        let trimmed = strip_bom(content).trim_start();
        trimmed.starts_with('{')
            || trimmed.starts_with('[')
            || context.extension().as_deref() == Some(".json")
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let value: Value = serde_json::from_str(strip_bom(content).trim())?;
        self.parse_value(&value, context)
    }
}

pub(crate) fn strip_bom(content: &str) -> &str {
    content.trim_start_matches('\u{feff}')
}

fn recipe_objects(value: &Value) -> Result<Vec<&Map<String, Value>>, ParseError> {
    match value {
        Value::Object(obj) => {
            if find_field(obj, NAME_KEYS).is_none() {
                if let Some(Value::Array(items)) = find_field(obj, WRAPPER_KEYS) {
                    return items.iter().map(as_recipe_object).collect();
                }
            }
            Ok(vec![obj])
        }
        Value::Array(items) => items.iter().map(as_recipe_object).collect(),
        other => Err(ParseError::UnsupportedStructure(format!(
            "expected a recipe object or array, found {}",
            json_type_name(other)
        ))),
    }
}

fn as_recipe_object(value: &Value) -> Result<&Map<String, Value>, ParseError> {
    value.as_object().ok_or_else(|| {
        ParseError::UnsupportedStructure(format!(
            "expected recipe objects in array, found {}",
            json_type_name(value)
        ))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts one recipe-shaped JSON value. The result is not finalized.
pub fn recipe_from_value(value: &Value) -> Option<ParsedRecipe> {
    value.as_object().map(recipe_from_map)
}

fn recipe_from_map(obj: &Map<String, Value>) -> ParsedRecipe {
    let mut metadata = HashMap::new();
    if let Some(cuisine) = find_field(obj, CUISINE_KEYS).map(texts_of) {
        if !cuisine.is_empty() {
            metadata.insert("cuisine".to_string(), cuisine.join(", "));
        }
    }
    if let Some(notes) = find_field(obj, NOTES_KEYS).and_then(text_of) {
        metadata.insert("notes".to_string(), notes);
    }
    collect_extra_metadata(obj, &mut metadata);

    ParsedRecipe {
        name: find_field(obj, NAME_KEYS).and_then(text_of).unwrap_or_default(),
        description: find_field(obj, DESCRIPTION_KEYS).and_then(text_of),
        author: find_field(obj, AUTHOR_KEYS).and_then(names_of),
        source: find_field(obj, SOURCE_KEYS).and_then(names_of),
        source_url: find_field(obj, SOURCE_URL_KEYS).and_then(text_of),
        prep_time_minutes: find_field(obj, PREP_TIME_KEYS).and_then(minutes_of),
        cook_time_minutes: find_field(obj, COOK_TIME_KEYS).and_then(minutes_of),
        total_time_minutes: find_field(obj, TOTAL_TIME_KEYS).and_then(minutes_of),
        servings: find_field(obj, SERVINGS_KEYS).and_then(servings_of),
        ingredients: find_field(obj, INGREDIENTS_KEYS)
            .map(ingredients_of)
            .unwrap_or_default(),
        instructions: find_field(obj, INSTRUCTIONS_KEYS)
            .map(instructions_of)
            .unwrap_or_default(),
        tags: find_field(obj, TAGS_KEYS).map(texts_of).unwrap_or_default(),
        categories: find_field(obj, CATEGORIES_KEYS)
            .map(texts_of)
            .unwrap_or_default(),
        image_url: find_field(obj, IMAGE_KEYS).and_then(image_of),
        metadata,
    }
}

/// Unrecognized scalar fields are kept so nothing the source said is lost.
fn collect_extra_metadata(obj: &Map<String, Value>, metadata: &mut HashMap<String, String>) {
    let known: &[&[&str]] = &[
        NAME_KEYS,
        DESCRIPTION_KEYS,
        AUTHOR_KEYS,
        SOURCE_KEYS,
        SOURCE_URL_KEYS,
        PREP_TIME_KEYS,
        COOK_TIME_KEYS,
        TOTAL_TIME_KEYS,
        SERVINGS_KEYS,
        INGREDIENTS_KEYS,
        INSTRUCTIONS_KEYS,
        TAGS_KEYS,
        CATEGORIES_KEYS,
        IMAGE_KEYS,
        CUISINE_KEYS,
        NOTES_KEYS,
    ];

    for (key, value) in obj {
        if key.starts_with('@') || known.iter().any(|keys| keys.contains(&key.as_str())) {
            continue;
        }
        let text = match value {
            Value::String(s) if !s.trim().is_empty() => decode_html_symbols(s),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        metadata.insert(key.clone(), text);
    }
}

/// First alias with a meaningful value. Exact key match wins over a
/// case-insensitive one.
fn find_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    let present = |value: &&Value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    };

    keys.iter()
        .find_map(|key| obj.get(*key).filter(present))
        .or_else(|| {
            keys.iter().find_map(|key| {
                obj.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
                    .filter(present)
            })
        })
}

fn decode_html_symbols(text: &str) -> String {
    // some producers double-encode entities
    decode_html_entities(&decode_html_entities(text))
        .trim()
        .to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(decode_html_symbols(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(text_of),
        Value::Object(obj) => ["name", "text", "@value", "url"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(text_of)),
        _ => None,
    }
}

/// Lists such as tags: an array of values, or a comma-separated string.
fn texts_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => decode_html_symbols(s)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        other => text_of(other).into_iter().collect(),
    }
}

/// People or organizations, possibly several.
fn names_of(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(text_of).collect();
            non_empty(names.join(", "))
        }
        other => text_of(other),
    }
}

fn minutes_of(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().map(|minutes| minutes.round() as i32),
        Value::String(s) => parse_duration_minutes(s),
        Value::Array(items) => items.iter().find_map(minutes_of),
        _ => None,
    }
}

fn servings_of(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().map(|servings| servings.round() as i32),
        Value::String(s) => parse_servings(s),
        Value::Array(items) => items.iter().find_map(servings_of),
        _ => None,
    }
}

fn image_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(decode_html_symbols(s)),
        Value::Array(items) => items.iter().find_map(image_of),
        Value::Object(obj) => ["url", "contentUrl", "@id"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(image_of)),
        _ => None,
    }
}

fn bool_of(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

struct IngredientCollector {
    items: Vec<ParsedIngredient>,
}

impl IngredientCollector {
    fn next_order(&self) -> i32 {
        self.items.len() as i32 + 1
    }

    fn push_line(&mut self, line: &str, section: Option<&str>) {
        let line = strip_list_marker(line);
        if line.is_empty() {
            return;
        }
        let order = self.next_order();
        self.items.push(parse_ingredient(line, order, section));
    }

    fn push_value(&mut self, value: &Value, section: Option<&str>) {
        match value {
            Value::String(s) => self.push_line(&decode_html_symbols(s), section),
            Value::Number(n) => self.push_line(&n.to_string(), section),
            Value::Array(items) => self.push_items(items, section),
            Value::Object(obj) => {
                if let Some(Value::Array(group)) = find_field(obj, INGREDIENT_GROUP_KEYS) {
                    let group_name = find_field(obj, &["name", "title", "section"])
                        .and_then(text_of)
                        .or_else(|| section.map(str::to_string));
                    self.push_items(group, group_name.as_deref());
                } else if looks_like_ingredient(obj) {
                    self.push_object(obj, section);
                } else {
                    // {"Dough": [...], "Filling": [...]}
                    for (group_name, group) in obj {
                        self.push_value(group, Some(group_name));
                    }
                }
            }
            _ => {}
        }
    }

    /// A `title` on an entry opens a new section for it and what follows.
    fn push_items(&mut self, items: &[Value], section: Option<&str>) {
        let mut current = section.map(str::to_string);
        for item in items {
            if let Some(obj) = item.as_object() {
                if let Some(title) = obj.get("title").and_then(text_of) {
                    current = Some(title);
                    // a bare header carries no ingredient of its own
                    if !looks_like_ingredient(obj)
                        && find_field(obj, INGREDIENT_GROUP_KEYS).is_none()
                    {
                        continue;
                    }
                }
            }
            self.push_value(item, current.as_deref());
        }
    }

    fn push_object(&mut self, obj: &Map<String, Value>, section: Option<&str>) {
        let section = find_field(obj, ING_SECTION_KEYS)
            .and_then(text_of)
            .or_else(|| section.map(str::to_string));
        let raw = find_field(obj, ING_RAW_KEYS).and_then(text_of);
        let name = find_field(obj, ING_NAME_KEYS).and_then(text_of);
        let notes = find_field(obj, ING_NOTES_KEYS).and_then(text_of);
        let order = self.next_order();

        let Some(name) = name else {
            // Unstructured entry: the line itself (or its note) carries everything
            if let Some(line) = raw.or(notes) {
                self.push_line(&line, section.as_deref());
            }
            return;
        };

        let (quantity, amount_unit) = match find_field(obj, ING_QUANTITY_KEYS) {
            Some(Value::Number(n)) => (n.as_f64(), None),
            Some(Value::String(s)) => {
                let parts = parse_ingredient_parts(s);
                match parts.quantity {
                    Some(q) => (Some(q), parts.unit),
                    None => (parse_quantity(s), None),
                }
            }
            _ => (None, None),
        };
        let unit = find_field(obj, ING_UNIT_KEYS)
            .and_then(text_of)
            .map(|unit| normalize_unit(&unit))
            .or(amount_unit);
        let preparation = find_field(obj, ING_PREP_KEYS).and_then(text_of);
        let is_optional = find_field(obj, ING_OPTIONAL_KEYS).is_some_and(bool_of);

        let original_text = raw.unwrap_or_else(|| {
            let mut text = [
                quantity.map(format_quantity),
                unit.clone(),
                Some(name.clone()),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
            if let Some(prep) = &preparation {
                text.push_str(", ");
                text.push_str(prep);
            }
            text
        });

        self.items.push(ParsedIngredient {
            order,
            section_name: section,
            quantity,
            unit,
            ingredient_name: name,
            preparation,
            notes,
            is_optional,
            original_text,
        });
    }
}

fn looks_like_ingredient(obj: &Map<String, Value>) -> bool {
    [ING_RAW_KEYS, ING_NAME_KEYS, ING_QUANTITY_KEYS, ING_NOTES_KEYS]
        .iter()
        .any(|keys| find_field(obj, keys).is_some())
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

fn ingredients_of(value: &Value) -> Vec<ParsedIngredient> {
    let mut collector = IngredientCollector { items: Vec::new() };
    match value {
        Value::String(blob) => {
            for line in split_blob_lines(&decode_html_symbols(blob)) {
                collector.push_line(&line, None);
            }
        }
        other => collector.push_value(other, None),
    }
    collector.items
}

struct InstructionCollector {
    steps: Vec<ParsedInstruction>,
}

impl InstructionCollector {
    fn push_text(&mut self, text: &str, section: Option<&str>) {
        let text = strip_list_marker(text);
        if text.is_empty() {
            return;
        }
        let step_number = self.steps.len() as i32 + 1;
        self.steps.push(parse_instruction(text, step_number, section));
    }

    fn push_value(&mut self, value: &Value, section: Option<&str>) {
        match value {
            Value::String(s) => self.push_text(&decode_html_symbols(s), section),
            Value::Array(items) => {
                for item in items {
                    self.push_value(item, section);
                }
            }
            Value::Object(obj) => {
                let is_section = obj
                    .get("@type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.eq_ignore_ascii_case("HowToSection"));
                let items = find_field(obj, SECTION_ITEMS_KEYS);

                if is_section || matches!(items, Some(Value::Array(_))) {
                    let name = find_field(obj, &["name", "title"])
                        .and_then(text_of)
                        .or_else(|| section.map(str::to_string));
                    if let Some(items) = items {
                        self.push_value(items, name.as_deref());
                    }
                } else if let Some(text) = find_field(obj, STEP_TEXT_KEYS).and_then(text_of) {
                    self.push_text(&text, section);
                }
            }
            _ => {}
        }
    }
}

fn instructions_of(value: &Value) -> Vec<ParsedInstruction> {
    let mut collector = InstructionCollector { steps: Vec::new() };
    match value {
        Value::String(blob) => {
            for line in decode_html_symbols(blob).lines() {
                for part in line.split(';') {
                    collector.push_text(part, None);
                }
            }
        }
        other => collector.push_value(other, None),
    }
    collector.steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(content: &str) -> Vec<ParsedRecipe> {
        JsonRecipeParser::default()
            .parse(content, &ParserContext::new())
            .unwrap()
    }

    #[test]
    fn test_tacos() {
        let recipes = parse(r#"{"name":"Tacos","ingredients":["1 cup salsa","2 tortillas"]}"#);
        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.name, "Tacos");
        assert_eq!(recipe.ingredients.len(), 2);

        assert_eq!(recipe.ingredients[0].quantity, Some(1.0));
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("cup"));
        assert_eq!(recipe.ingredients[0].ingredient_name, "salsa");

        assert_eq!(recipe.ingredients[1].quantity, Some(2.0));
        assert_eq!(recipe.ingredients[1].unit, None);
        assert_eq!(recipe.ingredients[1].ingredient_name, "tortillas");
    }

    #[test]
    fn test_aliases_and_times() {
        let recipes = parse(
            r#"{
                "title": "Chili",
                "summary": "Weeknight chili",
                "prep_time": "15 mins",
                "cookTime": "PT1H",
                "yield": "6 servings",
                "keywords": "beef, spicy",
                "recipeCategory": ["Dinner"],
                "directions": "Brown the beef; add beans\nSimmer 30 minutes"
            }"#,
        );
        let recipe = &recipes[0];
        assert_eq!(recipe.name, "Chili");
        assert_eq!(recipe.description.as_deref(), Some("Weeknight chili"));
        assert_eq!(recipe.prep_time_minutes, Some(15));
        assert_eq!(recipe.cook_time_minutes, Some(60));
        assert_eq!(recipe.total_time_minutes, Some(75));
        assert_eq!(recipe.servings, Some(6));
        assert_eq!(recipe.tags, vec!["beef", "spicy"]);
        assert_eq!(recipe.categories, vec!["Dinner"]);

        let steps: Vec<_> = recipe
            .instructions
            .iter()
            .map(|s| (s.step_number, s.instruction_text.as_str()))
            .collect();
        assert_eq!(
            steps,
            vec![
                (1, "Brown the beef"),
                (2, "add beans"),
                (3, "Simmer 30 minutes")
            ]
        );
        assert_eq!(recipe.instructions[2].time_minutes, Some(30));
    }

    #[test]
    fn test_structured_ingredient_objects() {
        let recipes = parse(
            r#"{
                "name": "Pancakes",
                "ingredients": [
                    {"quantity": 2, "unit": "Cups", "name": "flour", "preparation": "sifted"},
                    {"amount": "1 1/2", "unit": {"name": "tablespoon"}, "ingredient": "sugar"},
                    {"name": "blueberries", "optional": true},
                    {"text": "3 eggs, beaten"}
                ]
            }"#,
        );
        let ingredients = &recipes[0].ingredients;
        assert_eq!(ingredients.len(), 4);

        assert_eq!(ingredients[0].quantity, Some(2.0));
        assert_eq!(ingredients[0].unit.as_deref(), Some("cup"));
        assert_eq!(ingredients[0].preparation.as_deref(), Some("sifted"));
        assert_eq!(ingredients[0].original_text, "2 cup flour, sifted");

        assert_eq!(ingredients[1].quantity, Some(1.5));
        assert_eq!(ingredients[1].unit.as_deref(), Some("tbsp"));
        assert_eq!(ingredients[1].ingredient_name, "sugar");

        assert!(ingredients[2].is_optional);
        assert_eq!(ingredients[3].ingredient_name, "eggs");
        assert_eq!(ingredients[3].preparation.as_deref(), Some("beaten"));
        assert_eq!(
            ingredients.iter().map(|i| i.order).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_how_to_sections() {
        let value = json!({
            "@type": "Recipe",
            "name": "Layer Cake",
            "recipeInstructions": [
                {"@type": "HowToSection", "name": "Cake", "itemListElement": [
                    {"@type": "HowToStep", "text": "Bake the layers at 350°F."}
                ]},
                {"@type": "HowToSection", "name": "Frosting", "itemListElement": [
                    {"@type": "HowToStep", "text": "Whip the butter."}
                ]}
            ]
        });
        let recipe = recipe_from_value(&value).unwrap();
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.instructions[0].section_name.as_deref(), Some("Cake"));
        assert_eq!(recipe.instructions[0].temperature, Some(350));
        assert_eq!(recipe.instructions[1].section_name.as_deref(), Some("Frosting"));
        assert_eq!(recipe.instructions[1].step_number, 2);
    }

    #[test]
    fn test_grouped_ingredients() {
        let recipes = parse(
            r#"{"name": "Pie", "ingredients": {"Crust": ["2 cups flour"], "Filling": ["4 apples"]}}"#,
        );
        let ingredients = &recipes[0].ingredients;
        assert_eq!(ingredients[0].section_name.as_deref(), Some("Crust"));
        assert_eq!(ingredients[1].section_name.as_deref(), Some("Filling"));
    }

    #[test]
    fn test_array_and_wrapper() {
        let recipes = parse(r#"[{"name": "A"}, {"name": "B"}]"#);
        assert_eq!(recipes.len(), 2);

        let recipes = parse(r#"{"recipes": [{"title": "C"}]}"#);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "C");
    }

    #[test]
    fn test_author_and_image_objects() {
        let recipes = parse(
            r#"{
                "name": "Soup",
                "author": [{"@type": "Person", "name": "Ann"}, {"name": "Bo"}],
                "image": {"@type": "ImageObject", "url": "https://example.com/soup.jpg"},
                "rating": 4.5,
                "difficulty": "easy"
            }"#,
        );
        let recipe = &recipes[0];
        assert_eq!(recipe.author.as_deref(), Some("Ann, Bo"));
        assert_eq!(recipe.image_url.as_deref(), Some("https://example.com/soup.jpg"));
        assert_eq!(recipe.metadata.get("rating").map(String::as_str), Some("4.5"));
        assert_eq!(recipe.metadata.get("difficulty").map(String::as_str), Some("easy"));
    }

    #[test]
    fn test_html_entities_decoded() {
        let recipes = parse(r#"{"name": "Mac &amp; Cheese", "ingredients": ["1 cup macaroni &amp;amp; shells"]}"#);
        assert_eq!(recipes[0].name, "Mac & Cheese");
        assert_eq!(recipes[0].ingredients[0].ingredient_name, "macaroni & shells");
    }

    #[test]
    fn test_missing_name_is_synthesized() {
        let recipes = JsonRecipeParser::default()
            .parse(
                r#"{"ingredients": ["salt"]}"#,
                &ParserContext::new().with_file_name("quick_salt.json"),
            )
            .unwrap();
        assert_eq!(recipes[0].name, "quick salt");
    }

    #[test]
    fn test_malformed_json_is_error() {
        let parser = JsonRecipeParser::default();
        let result = parser.parse(r#"{"name": "Broken", "ingredients": ["#, &ParserContext::new());
        assert!(matches!(result, Err(ParseError::InvalidJson(_))));

        let result = parser.parse("42", &ParserContext::new());
        assert!(matches!(result, Err(ParseError::UnsupportedStructure(_))));

        let result = parser.parse(r#"[{"name": "ok"}, "nope"]"#, &ParserContext::new());
        assert!(matches!(result, Err(ParseError::UnsupportedStructure(_))));
    }

    #[test]
    fn test_can_parse() {
        let parser = JsonRecipeParser::default();
        assert!(parser.can_parse("  {\"name\": \"x\"}", &ParserContext::new()));
        assert!(parser.can_parse("\u{feff}[]", &ParserContext::new()));
        assert!(!parser.can_parse("Title\n2 eggs", &ParserContext::new()));
        assert!(parser.can_parse("", &ParserContext::new().with_file_name("a.JSON")));
    }
}
