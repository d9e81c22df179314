//! Scraped web pages.
//!
//! Extraction runs JSON-LD first, then selector heuristics, and finally falls
//! back to a placeholder so a page always yields exactly one recipe. A
//! site-specific parser is the same parser narrowed to one domain.

use log::debug;
use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{DetectionTier, RecipeParser, DEFAULT_FALLBACK_TITLE};
use crate::error::ParseError;
use crate::extractors::{ExtractionContext, Extractor, HtmlSelectorExtractor, JsonLdExtractor};
use crate::model::{ParsedRecipe, ParserContext};

const HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Built-in site table: domain and the source label its recipes carry.
pub const DEFAULT_SITES: &[(&str, &str)] = &[
    ("allrecipes.com", "allrecipes"),
    ("foodnetwork.com", "foodnetwork"),
    ("seriouseats.com", "seriouseats"),
    ("bbcgoodfood.com", "bbcgoodfood"),
    ("cooking.nytimes.com", "nytcooking"),
    ("epicurious.com", "epicurious"),
    ("simplyrecipes.com", "simplyrecipes"),
    ("budgetbytes.com", "budgetbytes"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSpec {
    pub domain: String,
    pub source: String,
}

impl SiteSpec {
    pub fn new(domain: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
            source: source.into(),
        }
    }

    pub fn defaults() -> Vec<SiteSpec> {
        DEFAULT_SITES
            .iter()
            .map(|(domain, source)| SiteSpec::new(*domain, *source))
            .collect()
    }

    /// True for the domain itself and any of its subdomains.
    pub fn matches_url(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        let domain = self.domain.to_lowercase();
        url.host_str().is_some_and(|host| {
            let host = host.to_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        })
    }
}

pub struct WebRecipeParser {
    site: Option<SiteSpec>,
    placeholder_title: String,
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for WebRecipeParser {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TITLE)
    }
}

impl WebRecipeParser {
    /// Accepts any HTML page.
    pub fn new(placeholder_title: impl Into<String>) -> Self {
        Self {
            site: None,
            placeholder_title: placeholder_title.into(),
            extractors: vec![Box::new(JsonLdExtractor), Box::new(HtmlSelectorExtractor)],
        }
    }

    /// Accepts only pages whose URL belongs to `site`.
    pub fn for_site(site: SiteSpec, placeholder_title: impl Into<String>) -> Self {
        Self {
            site: Some(site),
            ..Self::new(placeholder_title)
        }
    }

    pub fn site(&self) -> Option<&SiteSpec> {
        self.site.as_ref()
    }

    fn page_url(context: &ParserContext) -> Option<&str> {
        context
            .source_url
            .as_deref()
            .or(context.file_url.as_deref())
    }

    fn looks_like_html(content: &str, context: &ParserContext) -> bool {
        if context
            .extension()
            .is_some_and(|ext| HTML_EXTENSIONS.contains(&ext.as_str()))
        {
            return true;
        }
        let head = content
            .trim_start()
            .chars()
            .take(2048)
            .collect::<String>()
            .to_lowercase();
        ["<!doctype html", "<html", "<head", "<body"]
            .iter()
            .any(|marker| head.contains(marker))
            || content.contains("application/ld+json")
    }

    fn extract(&self, content: &str, context: &ParserContext) -> Option<ParsedRecipe> {
        let document = Html::parse_document(content);
        let base_url = Self::page_url(context).and_then(|url| Url::parse(url).ok());
        let extraction = ExtractionContext::new(&document, base_url.as_ref());

        for extractor in &self.extractors {
            if !extractor.can_parse(&extraction) {
                continue;
            }
            match extractor.parse(&extraction) {
                Ok(recipe) => {
                    debug!("WebRecipeParser: extracted with {}", extractor.name());
                    return Some(recipe);
                }
                Err(e) => debug!("WebRecipeParser: {} failed: {}", extractor.name(), e),
            }
        }
        None
    }
}

impl RecipeParser for WebRecipeParser {
    fn name(&self) -> &str {
        self.site.as_ref().map_or("web", |site| site.source.as_str())
    }

    fn source_type(&self) -> &str {
        self.name()
    }

    fn tier(&self) -> DetectionTier {
        if self.site.is_some() {
            DetectionTier::Specific
        } else {
            DetectionTier::Markup
        }
    }

    fn can_parse(&self, content: &str, context: &ParserContext) -> bool {
        if !Self::looks_like_html(content, context) {
            return false;
        }
        match &self.site {
            Some(site) => Self::page_url(context).is_some_and(|url| site.matches_url(url)),
            None => true,
        }
    }

    fn parse(
        &self,
        content: &str,
        context: &ParserContext,
    ) -> Result<Vec<ParsedRecipe>, ParseError> {
        let mut recipe = self.extract(content, context).unwrap_or_else(|| {
            debug!("WebRecipeParser: no recipe found, returning placeholder");
            ParsedRecipe::default()
        });

        if let Some(url) = &context.source_url {
            recipe.source_url = Some(url.clone());
        }
        if let Some(site) = &self.site {
            recipe.source.get_or_insert_with(|| site.source.clone());
        }

        Ok(vec![recipe.finalize(context, &self.placeholder_title)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_matching() {
        let site = SiteSpec::new("allrecipes.com", "allrecipes");
        assert!(site.matches_url("https://www.allrecipes.com/recipe/1/soup/"));
        assert!(site.matches_url("https://allrecipes.com/x"));
        assert!(!site.matches_url("https://notallrecipes.com/x"));
        assert!(!site.matches_url("not a url"));
    }

    #[test]
    fn test_site_parser_narrows_can_parse() {
        let parser = WebRecipeParser::for_site(SiteSpec::new("seriouseats.com", "seriouseats"), "Untitled");
        let html = "<html><body></body></html>";

        let on_site = ParserContext::new().with_source_url("https://www.seriouseats.com/pasta");
        let off_site = ParserContext::new().with_source_url("https://example.com/pasta");
        assert!(parser.can_parse(html, &on_site));
        assert!(!parser.can_parse(html, &off_site));
        assert!(!parser.can_parse("{\"name\": \"x\"}", &on_site));
        assert_eq!(parser.tier(), DetectionTier::Specific);
        assert_eq!(parser.name(), "seriouseats");
    }

    #[test]
    fn test_placeholder_never_empty() {
        let context = ParserContext::new().with_source_url("https://example.com/about");
        let recipes = WebRecipeParser::default()
            .parse("<html><body><p>Nothing here</p></body></html>", &context)
            .unwrap();

        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, DEFAULT_FALLBACK_TITLE);
        assert_eq!(recipes[0].source_url.as_deref(), Some("https://example.com/about"));
        assert!(recipes[0].ingredients.is_empty());
        assert!(recipes[0].instructions.is_empty());
    }

    #[test]
    fn test_json_ld_preferred_and_labelled() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type": "Recipe", "name": "JSON Soup", "url": "https://other.example/x",
             "recipeIngredient": ["1 cup broth"]}
            </script></head>
            <body><ul class="recipe-ingredients"><li>2 cups water</li></ul></body></html>"#;
        let context = ParserContext::new().with_source_url("https://www.allrecipes.com/soup");
        let parser = WebRecipeParser::for_site(SiteSpec::new("allrecipes.com", "allrecipes"), "Untitled");

        let recipe = &parser.parse(html, &context).unwrap()[0];
        assert_eq!(recipe.name, "JSON Soup");
        assert_eq!(recipe.ingredients[0].ingredient_name, "broth");
        assert_eq!(recipe.source_url.as_deref(), Some("https://www.allrecipes.com/soup"));
        assert_eq!(recipe.source.as_deref(), Some("allrecipes"));
    }
}
