//! Canonical model shared by every parser and by the ingredient decomposer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Per-call information about where the content came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserContext {
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = Some(file_url.into());
        self
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Lowercased extension of the file name, including the leading dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
    }

    /// File name without directory or extension, usable as a fallback title.
    pub fn file_stem(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.replace(['_', '-'], " ").trim().to_string())
            .filter(|stem| !stem.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    F,
    C,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    pub order: i32,
    pub section_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub ingredient_name: String,
    pub preparation: Option<String>,
    pub notes: Option<String>,
    pub is_optional: bool,
    /// Untouched source fragment
    pub original_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    pub step_number: i32,
    pub section_name: Option<String>,
    pub instruction_text: String,
    pub time_minutes: Option<i32>,
    pub temperature: Option<i32>,
    pub temperature_unit: Option<TemperatureUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub total_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<ParsedInstruction>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl ParsedRecipe {
    /// Applies the invariants every parser guarantees on its output: a
    /// non-empty name, a derived total time, and the context source URL.
    pub fn finalize(mut self, context: &ParserContext, fallback_title: &str) -> Self {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            self.name = context
                .file_stem()
                .unwrap_or_else(|| fallback_title.to_string());
        }

        if self.total_time_minutes.is_none() {
            self.total_time_minutes = match (self.prep_time_minutes, self.cook_time_minutes) {
                (None, None) => None,
                (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
            };
        }

        if self.source_url.is_none() {
            self.source_url = context.source_url.clone();
        }

        self
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

/// One node of a decomposed ingredient label. Each node owns its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredientComponent {
    pub name: String,
    pub base_ingredient_id: Option<i64>,
    pub matched_name: Option<String>,
    pub order_index: i32,
    pub is_parenthetical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_components: Option<Vec<ParsedIngredientComponent>>,
}

impl ParsedIngredientComponent {
    pub fn is_resolved(&self) -> bool {
        self.base_ingredient_id.is_some()
    }

    pub fn children(&self) -> &[ParsedIngredientComponent] {
        self.sub_components.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredientResult {
    pub original_string: String,
    pub components: Vec<ParsedIngredientComponent>,
}

impl ParsedIngredientResult {
    /// Visits every component depth-first: a node, then its children, then
    /// its next sibling.
    pub fn depth_first(&self) -> Vec<&ParsedIngredientComponent> {
        fn walk<'a>(
            nodes: &'a [ParsedIngredientComponent],
            out: &mut Vec<&'a ParsedIngredientComponent>,
        ) {
            for node in nodes {
                out.push(node);
                walk(node.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.components, &mut out);
        out
    }
}

/// Entry of the external base-ingredient taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseIngredientTaxonomyEntry {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub common_names: Option<Vec<String>>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
}
