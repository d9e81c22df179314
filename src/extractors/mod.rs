use crate::model::ParsedRecipe;
use scraper::Html;
use thiserror::Error;
use url::Url;

mod html_selectors;
mod json_ld;

pub use self::html_selectors::HtmlSelectorExtractor;
pub use self::json_ld::JsonLdExtractor;

/// A parsed page and the URL it was fetched from.
pub struct ExtractionContext<'a> {
    pub document: &'a Html,
    pub base_url: Option<&'a Url>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(document: &'a Html, base_url: Option<&'a Url>) -> Self {
        Self { document, base_url }
    }

    /// Resolves a possibly relative link against the page URL.
    pub fn resolve_url(&self, link: &str) -> String {
        let link = link.trim();
        if Url::parse(link).is_ok() {
            return link.to_string();
        }
        self.base_url
            .and_then(|base| base.join(link).ok())
            .map(String::from)
            .unwrap_or_else(|| link.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no recipe markup found")]
    NoRecipe,

    #[error("recipe markup has no ingredients or instructions")]
    NoContent,
}

pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;
    fn can_parse(&self, context: &ExtractionContext) -> bool;
    fn parse(&self, context: &ExtractionContext) -> Result<ParsedRecipe, ExtractError>;
}
