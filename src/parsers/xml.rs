//! XML recipe exports.
//!
//! The document is read into a small owned element tree first; recipes are
//! then mapped from that tree. Element and attribute names are compared
//! case-insensitively with `_` and `-` ignored, so `<PrepTime>`, `<prep_time>`
//! and `<prep-time>` are the same field.

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use thiserror::Error;

use super::{split_blob_lines, strip_list_marker, DetectionTier, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::measurement::{
    normalize_unit, parse_duration_minutes, parse_ingredient, parse_instruction, parse_quantity,
    parse_servings,
};
use crate::model::{ParsedIngredient, ParsedInstruction, ParsedRecipe, ParserContext};

#[derive(Error, Debug)]
enum XmlTreeError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,
}

#[derive(Debug, Default)]
struct XmlNode {
    /// Normalized local name
    name: String,
    text: String,
    attributes: HashMap<String, String>,
    children: Vec<XmlNode>,
}

fn normalize_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name)
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl XmlNode {
    fn from_start(start: &BytesStart) -> Self {
        let attributes = start
            .attributes()
            .filter_map(Result::ok)
            .filter_map(|attr| {
                let value = attr.unescape_value().ok()?.trim().to_string();
                Some((normalize_name(attr.key.local_name().as_ref()), value))
            })
            .collect();

        Self {
            name: normalize_name(start.local_name().as_ref()),
            attributes,
            ..Default::default()
        }
    }

    fn append_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(text);
    }

    fn child(&self, names: &[&str]) -> Option<&XmlNode> {
        names
            .iter()
            .find_map(|name| self.children.iter().find(|c| c.name == *name))
    }

    fn children_named<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a XmlNode> {
        self.children
            .iter()
            .filter(move |c| names.contains(&c.name.as_str()))
    }

    /// Text of the first matching child, or of a matching attribute.
    fn field(&self, names: &[&str]) -> Option<String> {
        self.child(names)
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| {
                names
                    .iter()
                    .find_map(|name| self.attributes.get(*name))
                    .filter(|v| !v.is_empty())
                    .cloned()
            })
    }

    fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == name {
                out.push(child);
            } else {
                child.find_all(name, out);
            }
        }
    }
}

fn parse_tree(content: &str) -> Result<XmlNode, XmlTreeError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack = vec![XmlNode::default()];
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlNode::from_start(&start)),
            Event::Empty(start) => {
                let node = XmlNode::from_start(&start);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(node) = stack.last_mut() {
                    node.append_text(&text);
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.append_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.pop().map(|n| n.name).unwrap_or_default();
        return Err(XmlTreeError::Unclosed(open));
    }
    stack
        .pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or(XmlTreeError::NoRoot)
}

const NAME_FIELDS: &[&str] = &["title", "name", "recipename"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "summary"];
const AUTHOR_FIELDS: &[&str] = &["author", "creator"];
const SOURCE_FIELDS: &[&str] = &["source", "publisher"];
const SOURCE_URL_FIELDS: &[&str] = &["sourceurl", "url", "link"];
const PREP_TIME_FIELDS: &[&str] = &["preptime", "preparationtime"];
const COOK_TIME_FIELDS: &[&str] = &["cooktime", "cookingtime"];
const TOTAL_TIME_FIELDS: &[&str] = &["totaltime"];
const SERVINGS_FIELDS: &[&str] = &["servings", "yield", "serves"];
const IMAGE_FIELDS: &[&str] = &["imageurl", "image", "photo"];
const CATEGORY_FIELDS: &[&str] = &["categories", "category"];
const TAG_FIELDS: &[&str] = &["tags", "tag", "keywords"];
const INGREDIENTS_FIELDS: &[&str] = &["ingredients", "ingredientlist"];
const INGREDIENT_FIELDS: &[&str] = &["ingredient", "item", "li"];
const INSTRUCTIONS_FIELDS: &[&str] = &["instructions", "directions", "steps", "method"];
const STEP_FIELDS: &[&str] = &["step", "instruction", "direction", "li"];
const SECTION_FIELDS: &[&str] = &["section", "group"];

const KNOWN_FIELDS: &[&[&str]] = &[
    NAME_FIELDS,
    DESCRIPTION_FIELDS,
    AUTHOR_FIELDS,
    SOURCE_FIELDS,
    SOURCE_URL_FIELDS,
    PREP_TIME_FIELDS,
    COOK_TIME_FIELDS,
    TOTAL_TIME_FIELDS,
    SERVINGS_FIELDS,
    IMAGE_FIELDS,
    CATEGORY_FIELDS,
    TAG_FIELDS,
    INGREDIENTS_FIELDS,
    INGREDIENT_FIELDS,
    INSTRUCTIONS_FIELDS,
    STEP_FIELDS,
];

fn list_field(node: &XmlNode, names: &[&str]) -> Vec<String> {
    let mut values = Vec::new();
    for child in node.children_named(names) {
        if child.children.is_empty() {
            values.extend(
                child
                    .text
                    .split([',', '\n'])
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        } else {
            values.extend(
                child
                    .children
                    .iter()
                    .map(|c| c.text.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }
    }
    values
}

fn is_structured_ingredient(node: &XmlNode) -> bool {
    !node.children.is_empty() || node.attributes.contains_key("quantity") || node.attributes.contains_key("unit")
}

fn ingredient_from_node(node: &XmlNode, order: i32, section: Option<&str>) -> Option<ParsedIngredient> {
    if !is_structured_ingredient(node) {
        let line = strip_list_marker(&node.text);
        return (!line.is_empty()).then(|| parse_ingredient(line, order, section));
    }

    let name = node.field(&["name", "item", "food", "ingredientname"]).or_else(|| {
        let text = node.text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })?;

    let quantity = node
        .field(&["quantity", "amount", "qty"])
        .and_then(|q| parse_quantity(&q));
    let unit = node.field(&["unit", "units", "measure"]).map(|u| normalize_unit(&u));
    let preparation = node.field(&["preparation", "prep"]);
    let notes = node.field(&["notes", "note"]);
    let is_optional = node
        .field(&["optional"])
        .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "yes" | "1"));

    let original_text = node.field(&["originaltext", "text"]).unwrap_or_else(|| {
        let quantity_text = node.field(&["quantity", "amount", "qty"]);
        let mut text = [quantity_text, node.field(&["unit", "units", "measure"]), Some(name.clone())]
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

    Some(ParsedIngredient {
        order,
        section_name: section.map(str::to_string),
        quantity,
        unit,
        ingredient_name: name,
        preparation,
        notes,
        is_optional,
        original_text,
    })
}

fn section_name(node: &XmlNode) -> Option<String> {
    node.attributes
        .get("name")
        .or_else(|| node.attributes.get("title"))
        .cloned()
        .or_else(|| node.field(&["name", "title"]))
}

fn collect_ingredients(node: &XmlNode, section: Option<&str>, out: &mut Vec<ParsedIngredient>) {
    for child in &node.children {
        if SECTION_FIELDS.contains(&child.name.as_str()) {
            let name = section_name(child);
            collect_ingredients(child, name.as_deref().or(section), out);
        } else if INGREDIENT_FIELDS.contains(&child.name.as_str()) {
            let order = out.len() as i32 + 1;
            if let Some(ingredient) = ingredient_from_node(child, order, section) {
                out.push(ingredient);
            }
        }
    }
}

fn ingredients_from_recipe(recipe: &XmlNode) -> Vec<ParsedIngredient> {
    let mut out = Vec::new();
    match recipe.child(INGREDIENTS_FIELDS) {
        Some(list) if list.children.is_empty() => {
            for line in split_blob_lines(&list.text) {
                let order = out.len() as i32 + 1;
                out.push(parse_ingredient(&line, order, None));
            }
        }
        Some(list) => collect_ingredients(list, None, &mut out),
        None => collect_ingredients(recipe, None, &mut out),
    }
    out
}

fn collect_steps(node: &XmlNode, section: Option<&str>, out: &mut Vec<ParsedInstruction>) {
    for child in &node.children {
        if SECTION_FIELDS.contains(&child.name.as_str()) {
            let name = section_name(child);
            collect_steps(child, name.as_deref().or(section), out);
        } else if STEP_FIELDS.contains(&child.name.as_str()) {
            let text = child
                .field(&["text", "description"])
                .unwrap_or_else(|| child.text.clone());
            let text = strip_list_marker(&text);
            if !text.is_empty() {
                let step = out.len() as i32 + 1;
                out.push(parse_instruction(text, step, section));
            }
        }
    }
}

fn instructions_from_recipe(recipe: &XmlNode) -> Vec<ParsedInstruction> {
    let mut out = Vec::new();
    match recipe.child(INSTRUCTIONS_FIELDS) {
        Some(list) if list.children.is_empty() => {
            for line in split_blob_lines(&list.text) {
                let step = out.len() as i32 + 1;
                out.push(parse_instruction(&line, step, None));
            }
        }
        Some(list) => collect_steps(list, None, &mut out),
        None => collect_steps(recipe, None, &mut out),
    }
    out
}

fn recipe_from_node(node: &XmlNode) -> ParsedRecipe {
    let metadata = node
        .children
        .iter()
        .filter(|c| c.children.is_empty() && !c.text.trim().is_empty())
        .filter(|c| !KNOWN_FIELDS.iter().any(|names| names.contains(&c.name.as_str())))
        .map(|c| (c.name.clone(), c.text.trim().to_string()))
        .collect();

    ParsedRecipe {
        name: node.field(NAME_FIELDS).unwrap_or_default(),
        description: node.field(DESCRIPTION_FIELDS),
        author: node.field(AUTHOR_FIELDS),
        source: node.field(SOURCE_FIELDS),
        source_url: node.field(SOURCE_URL_FIELDS),
        prep_time_minutes: node.field(PREP_TIME_FIELDS).and_then(|t| parse_duration_minutes(&t)),
        cook_time_minutes: node.field(COOK_TIME_FIELDS).and_then(|t| parse_duration_minutes(&t)),
        total_time_minutes: node.field(TOTAL_TIME_FIELDS).and_then(|t| parse_duration_minutes(&t)),
        servings: node.field(SERVINGS_FIELDS).and_then(|s| parse_servings(&s)),
        ingredients: ingredients_from_recipe(node),
        instructions: instructions_from_recipe(node),
        tags: list_field(node, TAG_FIELDS),
        categories: list_field(node, CATEGORY_FIELDS),
        image_url: node.field(IMAGE_FIELDS),
        metadata,
    }
}

pub struct XmlRecipeParser {
    fallback_title: String,
}

impl Default for XmlRecipeParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TITLE)
    }
}

impl XmlRecipeParser {
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            fallback_title: fallback_title.into(),
        }
    }

    fn placeholder(&self, error: &XmlTreeError, context: &ParserContext) -> ParsedRecipe {
        ParsedRecipe {
            description: Some(format!("Failed to parse XML: {error}")),
            ..Default::default()
        }
        .finalize(context, &self.fallback_title)
    }
}

impl RecipeParser for XmlRecipeParser {
    fn name(&self) -> &str {
        "xml"
    }

    fn source_type(&self) -> &str {
        "xml"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::Structured
    }

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with("<?xml") {
            return true;
        }
        if context.extension().as_deref() == Some(".xml") {
            return true;
        }
        let lower = trimmed.chars().take(2048).collect::<String>().to_lowercase();
        trimmed.starts_with('<') && lower.contains("<recipe") && !lower.contains("<html")
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let root = match parse_tree(content.trim_start_matches('\u{feff}')) {
            Ok(root) => root,
            Err(e) => {
                warn!("XmlRecipeParser: {}", e);
                return Ok(vec![self.placeholder(&e, context)]);
            }
        };

        let mut nodes = Vec::new();
        if root.name == "recipe" {
            nodes.push(&root);
        } else {
            root.find_all("recipe", &mut nodes);
        }
        if nodes.is_empty() {
            debug!("XmlRecipeParser: no <Recipe> element, reading root <{}>", root.name);
            nodes.push(&root);
        }

        Ok(nodes
            .into_iter()
            .map(|node| recipe_from_node(node).finalize(context, &self.fallback_title))
            .collect())
    }
}
