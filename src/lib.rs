pub mod config;
pub mod error;
pub mod extractors;
pub mod ingredients;
pub mod measurement;
pub mod model;
pub mod parsers;
pub mod registry;

pub use crate::config::{load_config, IngestConfig};
pub use crate::error::{IngestError, ParseError, TaxonomyError};
pub use crate::ingredients::{
    decompose, link_components, EntityResolver, InMemoryTaxonomy, LinkReport, TaxonomyRepository,
};
pub use crate::model::{
    BaseIngredientTaxonomyEntry, ParsedIngredient, ParsedIngredientComponent,
    ParsedIngredientResult, ParsedInstruction, ParsedRecipe, ParserContext,
};
pub use crate::parsers::{DetectionTier, RecipeParser};
pub use crate::registry::ParserRegistry;

use log::debug;

/// Parses content with the default registry.
pub fn parse_recipes(
    content: &str,
    context: &ParserContext,
) -> Result<Vec<ParsedRecipe>, ParseError> {
    let recipes = ParserRegistry::default().parse(content, context)?;
    debug!("Parsed {} recipes", recipes.len());
    Ok(recipes)
}
