//! Line-oriented legacy format (Meal-Master and look-alikes).

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{DetectionTier, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::measurement::{
    parse_duration_minutes, parse_ingredient, parse_instruction, parse_servings,
};
use crate::model::{ParsedRecipe, ParserContext};

const EXTENSIONS: &[&str] = &[".mmf", ".mm", ".mxp"];

/// Longest line with two leading spaces still read as an ingredient
const MAX_INDENTED_INGREDIENT_LEN: usize = 60;

/// Shortest line accepted as an instruction step
const MIN_INSTRUCTION_LEN: usize = 20;

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z ]{0,19}?)\s*:\s*(.*)$").expect("Invalid header regex")
});

static SUBSECTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z \-]{2,49}$").expect("Invalid subsection regex")
});

static BANNER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)meal-master|recipe via|recipe extracted|now you're cooking")
        .expect("Invalid banner regex")
});

#[derive(Debug, PartialEq)]
enum Delimiter {
    /// Starts a new recipe
    Banner,
    /// Ends the current recipe
    End,
    /// Labelled divider inside a recipe, e.g. `-----FROSTING-----`
    Subsection(String),
}

fn delimiter(line: &str) -> Option<Delimiter> {
    let trimmed = line.trim();
    if !(trimmed.starts_with("MMMMM") || trimmed.starts_with("-----")) {
        return None;
    }
    if BANNER_REGEX.is_match(trimmed) {
        return Some(Delimiter::Banner);
    }

    let body = trimmed.strip_prefix("MMMMM").unwrap_or(trimmed);
    let label = body.trim_matches(|c: char| c == '-' || c.is_whitespace());
    if label.is_empty() {
        Some(Delimiter::End)
    } else {
        Some(Delimiter::Subsection(label.to_string()))
    }
}

#[derive(Default)]
struct RecipeBuilder {
    recipe: ParsedRecipe,
    section: Option<String>,
}

impl RecipeBuilder {
    fn is_blank(&self) -> bool {
        self.recipe.name.is_empty() && self.recipe.is_empty()
    }

    fn apply_header(&mut self, label: &str, value: &str) -> bool {
        let value = value.trim();
        match label.trim().to_lowercase().as_str() {
            "title" | "name" => self.recipe.name = value.to_string(),
            "categories" | "category" => self.recipe.categories.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("none"))
                    .map(str::to_string),
            ),
            "yield" | "servings" | "serves" | "makes" => {
                self.recipe.servings = parse_servings(value)
            }
            "prep time" | "preparation time" | "prep" => {
                self.recipe.prep_time_minutes = parse_duration_minutes(value)
            }
            "cook time" | "cooking time" | "cook" => {
                self.recipe.cook_time_minutes = parse_duration_minutes(value)
            }
            "total time" | "ready in" => {
                self.recipe.total_time_minutes = parse_duration_minutes(value)
            }
            "source" | "from" => self.recipe.source = Some(value.to_string()),
            "author" | "by" => self.recipe.author = Some(value.to_string()),
            "description" => self.recipe.description = Some(value.to_string()),
            _ => return false,
        }
        true
    }

    fn push_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(caps) = HEADER_REGEX.captures(line) {
            if self.apply_header(&caps[1], &caps[2]) {
                return;
            }
        }

        if SUBSECTION_REGEX.is_match(trimmed) && trimmed.chars().any(|c| c.is_alphabetic()) {
            self.section = Some(trimmed.to_string());
            return;
        }

        // "-finely chopped" continues the previous ingredient
        if let Some(rest) = trimmed.strip_prefix('-') {
            if self.recipe.instructions.is_empty() {
                if let Some(last) = self.recipe.ingredients.last_mut() {
                    let rest = rest.trim();
                    last.original_text = format!("{} {}", last.original_text.trim_end(), rest);
                    last.preparation = Some(match last.preparation.take() {
                        Some(prep) => format!("{prep} {rest}"),
                        None => rest.to_string(),
                    });
                    return;
                }
            }
        }

        if is_ingredient_line(line) {
            let order = self.recipe.ingredients.len() as i32 + 1;
            self.recipe
                .ingredients
                .push(parse_ingredient(trimmed, order, self.section.as_deref()));
            return;
        }

        if trimmed.len() >= MIN_INSTRUCTION_LEN && !trimmed.contains(':') {
            let step = self.recipe.instructions.len() as i32 + 1;
            self.recipe
                .instructions
                .push(parse_instruction(trimmed, step, None));
        }
    }
}

fn is_ingredient_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return true;
    }
    line.starts_with("  ")
        && trimmed.len() <= MAX_INDENTED_INGREDIENT_LEN
        && !trimmed.ends_with('.')
}

pub struct MealMasterParser {
    fallback_title: String,
}

impl Default for MealMasterParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TITLE)
    }
}

impl MealMasterParser {
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            fallback_title: fallback_title.into(),
        }
    }
}

impl RecipeParser for MealMasterParser {
    fn name(&self) -> &str {
        "mealmaster"
    }

    fn source_type(&self) -> &str {
        "mealmaster"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::Specific
    }

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool {
        if content.contains("MMMMM") {
            return true;
        }
        if content
            .lines()
            .any(|line| matches!(delimiter(line), Some(Delimiter::Banner)))
        {
            return true;
        }
        context
            .extension()
            .is_some_and(|ext| EXTENSIONS.contains(&ext.as_str()))
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let mut finished = Vec::new();
        let mut current = RecipeBuilder::default();

        for line in content.lines() {
            match delimiter(line) {
                Some(Delimiter::Banner) | Some(Delimiter::End) => {
                    let done = std::mem::take(&mut current);
                    if !done.is_blank() {
                        finished.push(done.recipe);
                    }
                }
                Some(Delimiter::Subsection(label)) => current.section = Some(label),
                None => current.push_line(line),
            }
        }
        if !current.is_blank() {
            finished.push(current.recipe);
        }

        if finished.is_empty() {
            finished.push(ParsedRecipe::default());
        }
        debug!("MealMasterParser: parsed {} recipe(s)", finished.len());

        Ok(finished
            .into_iter()
            .map(|recipe| recipe.finalize(context, &self.fallback_title))
            .collect())
    }
}
