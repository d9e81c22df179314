//! Free-form plain text, the parser of last resort.
//!
//! Each line is classified by [`classify_line`] against the section state left
//! by the previous line. The classifier is pure; the parser only folds its
//! output into a recipe.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{strip_list_marker, DetectionTier, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::measurement::{
    parse_duration_minutes, parse_ingredient, parse_instruction, parse_servings,
};
use crate::model::{ParsedRecipe, ParserContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Unknown,
    Ingredients,
    Instructions,
    Description,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// Section header such as `Ingredients:`
    Header(SectionState),
    /// Named group inside a section, e.g. `For the sauce:`
    Subheading(String),
    /// Servings or timing line, read separately
    Metadata,
    Ingredient(String),
    Instruction(String),
    Description(String),
}

/// Lines longer than this that mention "until" or "minute" read as steps
const LONG_LINE_LEN: usize = 60;

const COOKING_VERBS: &[&str] = &[
    "add", "allow", "arrange", "bake", "beat", "blend", "boil", "bring", "broil", "brown",
    "brush", "chill", "chop", "combine", "cook", "cool", "cover", "cut", "dice", "drain",
    "drizzle", "fill", "fold", "fry", "garnish", "grate", "grease", "grill", "heat", "in",
    "knead", "layer", "let", "line", "marinate", "mash", "meanwhile", "melt", "microwave",
    "mince", "mix", "place", "pour", "preheat", "prepare", "press", "put", "reduce",
    "refrigerate", "remove", "return", "rinse", "roast", "roll", "saute", "sauté", "season",
    "serve", "set", "shape", "simmer", "slice", "spoon", "spread", "sprinkle", "stir",
    "strain", "take", "top", "toss", "transfer", "turn", "using", "wash", "when", "whip",
    "whisk", "wrap",
];

const QUANTITY_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "half", "dozen", "few", "several", "pinch", "handful", "dash",
];

static INGREDIENTS_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:ingredients?|what you(?:'ll| will)? need|you will need)\s*:?\s*$")
        .expect("Invalid ingredients header regex")
});

static INSTRUCTIONS_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:instructions?|directions?|method|steps|preparation|how to make it)\s*:?\s*$",
    )
    .expect("Invalid instructions header regex")
});

static DESCRIPTION_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:description|about|notes?|intro(?:duction)?|summary)\s*:?\s*$")
        .expect("Invalid description header regex")
});

static SUBHEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z '&/-]{1,38}):\s*$").expect("Invalid subheading regex")
});

static NUMBERED_STEP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s").expect("Invalid numbered step regex"));

static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*•·▪]+\s*").expect("Invalid bullet regex"));

static UNIT_KEYWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:cups?|tablespoons?|teaspoons?|tbsps?|tsps?|ounces?|oz|pounds?|lbs?|grams?|kg|ml|liters?|litres?|pinch|cloves?|sticks?)\b",
    )
    .expect("Invalid unit keyword regex")
});

static METADATA_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:prep(?:aration)?|cook(?:ing)?|bak(?:e|ing)|total|ready|serves|servings|yields?|makes)\b",
    )
    .expect("Invalid metadata label regex")
});

static PREP_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bprep(?:aration)?\s*(?:time\b\s*:?|:)\s*([^|;,\n]+)")
        .expect("Invalid prep time regex")
});

static COOK_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:cook(?:ing)?|bake|baking)\s*(?:time\b\s*:?|:)\s*([^|;,\n]+)")
        .expect("Invalid cook time regex")
});

static TOTAL_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:total\s*(?:time\b\s*:?|:)|ready\s+in\b\s*:?)\s*([^|;,\n]+)")
        .expect("Invalid total time regex")
});

static SERVINGS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:serves|servings|yields?|makes)\b\s*:?\s*([^|;,\n]+)")
        .expect("Invalid servings regex")
});

static SERVINGS_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(?:servings|portions)\b").expect("Invalid servings count regex")
});

fn first_word(line: &str) -> String {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn starts_with_cooking_verb(line: &str) -> bool {
    COOKING_VERBS.contains(&first_word(line).as_str())
}

fn looks_like_ingredient(line: &str) -> bool {
    let line = BULLET_REGEX.replace(line, "");
    let trimmed = line.trim();
    if trimmed.starts_with(|c: char| c.is_ascii_digit() || "½⅓⅔¼¾⅛⅜⅝⅞".contains(c)) {
        return true;
    }

    let word = first_word(trimmed);
    if QUANTITY_WORDS.contains(&word.as_str()) {
        return true;
    }
    if !starts_with_cooking_verb(trimmed) && UNIT_KEYWORD_REGEX.is_match(trimmed) {
        return trimmed.len() <= LONG_LINE_LEN;
    }
    false
}

fn looks_like_instruction(line: &str) -> bool {
    if NUMBERED_STEP_REGEX.is_match(line) {
        return true;
    }
    let stripped = strip_list_marker(line);
    if starts_with_cooking_verb(stripped) {
        return true;
    }
    let lower = stripped.to_lowercase();
    stripped.len() > LONG_LINE_LEN && (lower.contains("until") || lower.contains("minute"))
}

fn is_metadata_line(line: &str) -> bool {
    if !METADATA_LABEL_REGEX.is_match(line) {
        return SERVINGS_COUNT_REGEX
            .find(line)
            .is_some_and(|m| m.start() == line.len() - line.trim_start().len() && m.end() == line.trim_end().len());
    }
    scan_prep_time(line).is_some()
        || scan_cook_time(line).is_some()
        || scan_total_time(line).is_some()
        || scan_servings(line).is_some()
}

/// Classifies one line given the section the previous lines left us in.
///
/// Returns the line's kind and the section state for the next line.
pub fn classify_line(line: &str, state: SectionState) -> (LineKind, SectionState) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return (LineKind::Blank, state);
    }

    for (regex, section) in [
        (&*INGREDIENTS_HEADER_REGEX, SectionState::Ingredients),
        (&*INSTRUCTIONS_HEADER_REGEX, SectionState::Instructions),
        (&*DESCRIPTION_HEADER_REGEX, SectionState::Description),
    ] {
        if regex.is_match(trimmed) {
            return (LineKind::Header(section), section);
        }
    }

    if is_metadata_line(trimmed) {
        return (LineKind::Metadata, state);
    }

    if matches!(state, SectionState::Ingredients | SectionState::Instructions) {
        if let Some(caps) = SUBHEADING_REGEX.captures(trimmed) {
            return (LineKind::Subheading(caps[1].trim().to_string()), state);
        }
    }

    let text = strip_list_marker(trimmed).to_string();
    match state {
        SectionState::Ingredients => {
            let switches = looks_like_instruction(trimmed)
                && !(looks_like_ingredient(&text) && !starts_with_cooking_verb(&text));
            if switches {
                (LineKind::Instruction(text), SectionState::Instructions)
            } else {
                (LineKind::Ingredient(text), state)
            }
        }
        SectionState::Instructions => (LineKind::Instruction(text), state),
        SectionState::Description => (LineKind::Description(text), state),
        SectionState::Unknown => {
            if NUMBERED_STEP_REGEX.is_match(trimmed) {
                (LineKind::Instruction(text), state)
            } else if looks_like_ingredient(trimmed) {
                (LineKind::Ingredient(text), state)
            } else if looks_like_instruction(trimmed) {
                (LineKind::Instruction(text), state)
            } else {
                (LineKind::Description(text), state)
            }
        }
    }
}

fn scan_labelled(regex: &Regex, content: &str) -> Option<i32> {
    regex
        .captures_iter(content)
        .find_map(|caps| parse_duration_minutes(&caps[1]))
}

fn scan_prep_time(content: &str) -> Option<i32> {
    scan_labelled(&PREP_TIME_REGEX, content)
}

fn scan_cook_time(content: &str) -> Option<i32> {
    scan_labelled(&COOK_TIME_REGEX, content)
}

fn scan_total_time(content: &str) -> Option<i32> {
    scan_labelled(&TOTAL_TIME_REGEX, content)
}

fn scan_servings(content: &str) -> Option<i32> {
    SERVINGS_REGEX
        .captures_iter(content)
        .find_map(|caps| parse_servings(&caps[1]))
        .or_else(|| {
            SERVINGS_COUNT_REGEX
                .captures(content)
                .and_then(|caps| caps[1].parse().ok())
        })
}

fn clean_title(line: &str) -> String {
    let line = line.trim().trim_start_matches('#').trim();
    let line = match line.split_once(':') {
        Some((label, rest)) if label.trim().eq_ignore_ascii_case("title") => rest.trim(),
        _ => line,
    };
    line.to_string()
}

pub struct PlainTextParser {
    fallback_title: String,
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TITLE)
    }
}

impl PlainTextParser {
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            fallback_title: fallback_title.into(),
        }
    }
}

impl RecipeParser for PlainTextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn source_type(&self) -> &str {
        "text"
    }

    fn tier(&self) -> DetectionTier {
        DetectionTier::Fallback
    }

    fn can_parse(&self, content: &str, _context: &ParserContext) -> bool {
        !content.trim().is_empty()
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let mut recipe = ParsedRecipe::default();
        let mut lines = content.lines().skip_while(|line| line.trim().is_empty()).peekable();

        if let Some(first) = lines.peek() {
            if matches!(classify_line(first, SectionState::Unknown).0, LineKind::Header(_)) {
                debug!("PlainTextParser: content starts with a section header, no title line");
            } else {
                recipe.name = clean_title(first);
                lines.next();
            }
        }

        let mut state = SectionState::Unknown;
        let mut group: Option<String> = None;
        let mut description = Vec::new();

        for line in lines {
            let (kind, next) = classify_line(line, state);
            if next != state {
                group = None;
            }
            state = next;

            match kind {
                LineKind::Ingredient(text) => {
                    let order = recipe.ingredients.len() as i32 + 1;
                    recipe
                        .ingredients
                        .push(parse_ingredient(&text, order, group.as_deref()));
                }
                LineKind::Instruction(text) => {
                    let step = recipe.instructions.len() as i32 + 1;
                    recipe
                        .instructions
                        .push(parse_instruction(&text, step, group.as_deref()));
                }
                LineKind::Description(text) => description.push(text),
                LineKind::Subheading(name) => group = Some(name),
                LineKind::Header(_) => group = None,
                LineKind::Blank | LineKind::Metadata => {}
            }
        }

        if !description.is_empty() {
            recipe.description = Some(description.join("\n"));
        }
        recipe.prep_time_minutes = scan_prep_time(content);
        recipe.cook_time_minutes = scan_cook_time(content);
        recipe.total_time_minutes = scan_total_time(content);
        recipe.servings = scan_servings(content);

        debug!(
            "PlainTextParser: {} ingredients, {} instructions",
            recipe.ingredients.len(),
            recipe.instructions.len()
        );

        Ok(vec![recipe.finalize(context, &self.fallback_title)])
    }
}
