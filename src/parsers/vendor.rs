//! Vendor exports that are the generic structured format plus a few quirks.
//!
//! A vendor is described by data only: the markers that identify its export,
//! the fields that may hold an unsplit blob, and export fields that carry no
//! recipe data.

use log::debug;
use serde_json::{Map, Value};

use super::json::strip_bom;
use super::{DetectionTier, JsonRecipeParser, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::model::{ParsedRecipe, ParserContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorSpec {
    pub name: &'static str,
    pub source_type: &'static str,
    /// File extensions that identify an export regardless of content
    pub extensions: &'static [&'static str],
    /// Literal fragments that must all appear in the content
    pub markers: &'static [&'static str],
    /// Fields whose entries may each hold several newline-separated items
    pub list_fields: &'static [&'static str],
    /// Fields removed before conversion
    pub dropped_fields: &'static [&'static str],
}

pub const PAPRIKA: VendorSpec = VendorSpec {
    name: "paprika",
    source_type: "paprika",
    extensions: &[".paprikarecipe"],
    markers: &["\"uid\"", "\"directions\""],
    list_fields: &["ingredients", "directions"],
    dropped_fields: &["photo_data", "photos", "photo_hash", "hash"],
};

pub const MEALIE: VendorSpec = VendorSpec {
    name: "mealie",
    source_type: "mealie",
    extensions: &[],
    markers: &["\"slug\"", "\"recipe_ingredient\""],
    list_fields: &["recipe_ingredient", "recipe_instructions"],
    dropped_fields: &["id", "user_id", "group_id", "household_id"],
};

pub const VENDORS: &[VendorSpec] = &[PAPRIKA, MEALIE];

/// Text-bearing keys of an entry object that may hold a blob
const ENTRY_TEXT_KEYS: &[&str] = &["text", "note", "display", "original_text"];

pub struct VendorJsonParser {
    spec: VendorSpec,
    json: JsonRecipeParser,
}

impl VendorJsonParser {
    pub fn new(spec: VendorSpec) -> Self {
        Self::with_fallback_title(spec, DEFAULT_FALLBACK_TITLE)
    }

    pub fn with_fallback_title(spec: VendorSpec, fallback_title: impl Into<String>) -> Self {
        Self {
            spec,
            json: JsonRecipeParser::new(fallback_title),
        }
    }

    pub fn spec(&self) -> &VendorSpec {
        &self.spec
    }

    fn prepare(&self, value: &mut Value) {
        match value {
            Value::Array(items) => items.iter_mut().for_each(|item| self.prepare(item)),
            Value::Object(obj) => {
                for field in self.spec.dropped_fields {
                    obj.remove(*field);
                }
                for field in self.spec.list_fields {
                    if let Some(Value::Array(entries)) = obj.get_mut(*field) {
                        let count = entries.len();
                        *entries = split_blob_entries(std::mem::take(entries));
                        if entries.len() != count {
                            debug!(
                                "{}: re-split '{}' from {} to {} entries",
                                self.spec.name,
                                field,
                                count,
                                entries.len()
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn blob_lines(text: &str) -> Option<Vec<String>> {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    (lines.len() > 1).then_some(lines)
}

/// Expands every entry that carries several newline-separated items into one
/// entry per item, keeping the rest of an object entry on each copy.
fn split_blob_entries(entries: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match &entry {
            Value::String(text) => match blob_lines(text) {
                Some(lines) => out.extend(lines.into_iter().map(Value::String)),
                None => out.push(entry),
            },
            Value::Object(obj) => match blob_key(obj) {
                Some((key, lines)) => {
                    for line in lines {
                        let mut copy = obj.clone();
                        // a blob entry no longer has one structured reading
                        for other in ENTRY_TEXT_KEYS.iter().filter(|k| **k != key) {
                            copy.remove(*other);
                        }
                        copy.insert(key.to_string(), Value::String(line));
                        out.push(Value::Object(copy));
                    }
                }
                None => out.push(entry),
            },
            _ => out.push(entry),
        }
    }
    out
}

fn blob_key(obj: &Map<String, Value>) -> Option<(&'static str, Vec<String>)> {
    ENTRY_TEXT_KEYS.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .and_then(blob_lines)
            .map(|lines| (*key, lines))
    })
}

impl RecipeParser for VendorJsonParser {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn source_type(&self) -> &str {
        self.spec.source_type
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::Specific
    }

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool {
        if context
            .extension()
            .is_some_and(|ext| self.spec.extensions.contains(&ext.as_str()))
        {
            return true;
        }
        let trimmed = strip_bom(content).trim_start();
        (trimmed.starts_with('{') || trimmed.starts_with('['))
            && self.spec.markers.iter().all(|marker| content.contains(marker))
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let mut value: Value = serde_json::from_str(strip_bom(content).trim())?;
        self.prepare(&mut value);

        let mut recipes = self.json.parse_value(&value, context)?;
        for recipe in &mut recipes {
            recipe
                .metadata
                .insert("vendor".to_string(), self.spec.name.to_string());
        }
        Ok(recipes)
    }
}
