use log::debug;

use crate::config::IngestConfig;
use crate::error::ParseError;
use crate::model::{ParsedRecipe, ParserContext};
use crate::parsers::{
    JsonRecipeParser, MealMasterParser, PlainTextParser, RecipeParser, VendorJsonParser,
    WebRecipeParser, XmlRecipeParser, VENDORS,
};

/// Ordered set of format parsers.
///
/// Parsers are kept sorted by [`DetectionTier`](crate::parsers::DetectionTier);
/// within a tier the order they were supplied in is preserved. Detection holds
/// no state and can be shared across threads.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn RecipeParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

impl ParserRegistry {
    pub fn new(mut parsers: Vec<Box<dyn RecipeParser>>) -> Self {
        // stable sort keeps insertion order inside a tier
        parsers.sort_by_key(|parser| parser.tier());
        Self { parsers }
    }

    /// Builds the standard parser set from configuration
    pub fn from_config(config: &IngestConfig) -> Self {
        let fallback_title = config.parsing.fallback_title.as_str();
        let placeholder_title = config.web.placeholder_title.as_str();

        let mut parsers: Vec<Box<dyn RecipeParser>> = Vec::new();
        for spec in VENDORS {
            parsers.push(Box::new(VendorJsonParser::with_fallback_title(
                *spec,
                fallback_title,
            )));
        }
        parsers.push(Box::new(MealMasterParser::new(fallback_title)));
        for site in &config.web.sites {
            parsers.push(Box::new(WebRecipeParser::for_site(
                site.clone(),
                placeholder_title,
            )));
        }
        parsers.push(Box::new(JsonRecipeParser::new(fallback_title)));
        parsers.push(Box::new(XmlRecipeParser::new(fallback_title)));
        parsers.push(Box::new(WebRecipeParser::new(placeholder_title)));
        parsers.push(Box::new(PlainTextParser::new(fallback_title)));

        Self::new(parsers)
    }

    /// First parser, in detection order, that accepts the content
    pub fn detect(&self, content: &str, context: &ParserContext) -> Option<&dyn RecipeParser> {
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.can_parse(content, context))
            .map(|parser| parser.as_ref());
        match parser {
            Some(parser) => debug!("Detected format: {}", parser.name()),
            None => debug!("No parser accepted the content"),
        }
        parser
    }

    /// Detects the format and parses with the chosen parser
    pub fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let parser = self
            .detect(content, context)
            .ok_or(ParseError::NoParserMatched)?;
        parser.parse(content, context)
    }

    pub fn get_by_name(&self, name: &str) -> Result<&dyn RecipeParser, ParseError> {
        self.parsers
            .iter()
            .find(|parser| parser.name() == name)
            .map(|parser| parser.as_ref())
            .ok_or_else(|| ParseError::UnknownParser(name.to_string()))
    }

    pub fn get_by_source_type(&self, source_type: &str) -> Result<&dyn RecipeParser, ParseError> {
        self.parsers
            .iter()
            .find(|parser| parser.source_type() == source_type)
            .map(|parser| parser.as_ref())
            .ok_or_else(|| ParseError::UnknownParser(source_type.to_string()))
    }

    /// Parsers in detection order
    pub fn parsers(&self) -> impl Iterator<Item = &dyn RecipeParser> {
        self.parsers.iter().map(|parser| parser.as_ref())
    }
}
