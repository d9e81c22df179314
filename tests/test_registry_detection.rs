#[cfg(test)]
mod tests {
    use recipe_ingest::parsers::{DetectionTier, PlainTextParser, XmlRecipeParser};
    use recipe_ingest::{ParseError, ParserContext, ParserRegistry, RecipeParser};

    const MEAL_MASTER: &str = "\
MMMMM----- Recipe via Meal-Master (tm) v8.05

      Title: Cheese Toast
 Categories: Snacks
      Yield: 2 servings

      4 sl   Bread
      4 oz   Cheddar cheese

  Lay the cheese on the bread and grill until it bubbles.

MMMMM
";

    fn detected(content: &str, context: &ParserContext) -> String {
        ParserRegistry::default()
            .detect(content, context)
            .map(|parser| parser.name().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_legacy_marker_beats_free_text() {
        let context = ParserContext::new();
        assert!(PlainTextParser::default().can_parse(MEAL_MASTER, &context));
        assert_eq!(detected(MEAL_MASTER, &context), "mealmaster");

        let recipes = ParserRegistry::default().parse(MEAL_MASTER, &context).unwrap();
        assert_eq!(recipes[0].name, "Cheese Toast");
        assert_eq!(recipes[0].ingredients[0].unit.as_deref(), Some("slice"));
    }

    #[test]
    fn test_detection_by_content() {
        let context = ParserContext::new();
        assert_eq!(detected(r#"{"name": "Tacos"}"#, &context), "json");
        assert_eq!(
            detected(r#"<?xml version="1.0"?><Recipe><Title>X</Title></Recipe>"#, &context),
            "xml"
        );
        assert_eq!(
            detected("<!DOCTYPE html><html><body></body></html>", &context),
            "web"
        );
        assert_eq!(detected("Toast\nToast the bread.", &context), "text");
        assert_eq!(
            detected(r#"{"uid": "A1", "name": "Soup", "directions": "Boil."}"#, &context),
            "paprika"
        );
        assert_eq!(
            detected(r#"{"slug": "soup", "name": "Soup", "recipe_ingredient": []}"#, &context),
            "mealie"
        );
    }

    #[test]
    fn test_site_parser_selected_by_url() {
        let html = "<html><body><p>hello</p></body></html>";
        let on_site = ParserContext::new().with_source_url("https://www.budgetbytes.com/chili/");
        let off_site = ParserContext::new().with_source_url("https://blog.example/chili/");

        assert_eq!(detected(html, &on_site), "budgetbytes");
        assert_eq!(detected(html, &off_site), "web");
    }

    #[test]
    fn test_explicit_order_does_not_matter() {
        let registry = ParserRegistry::new(vec![
            Box::new(PlainTextParser::default()),
            Box::new(XmlRecipeParser::default()),
        ]);
        let tiers: Vec<DetectionTier> = registry.parsers().map(|p| p.tier()).collect();
        assert_eq!(tiers, vec![DetectionTier::Structured, DetectionTier::Fallback]);

        let parser = registry
            .detect("<recipe><name>A</name></recipe>", &ParserContext::new())
            .unwrap();
        assert_eq!(parser.name(), "xml");
    }

    #[test]
    fn test_lookup_errors() {
        let registry = ParserRegistry::default();
        assert!(registry.get_by_name("mealmaster").is_ok());
        assert!(registry.get_by_source_type("epicurious").is_ok());
        assert!(matches!(
            registry.get_by_source_type("cookbook"),
            Err(ParseError::UnknownParser(_))
        ));
    }

    #[test]
    fn test_detection_is_repeatable() {
        let registry = ParserRegistry::default();
        let context = ParserContext::new().with_file_name("notes.txt");
        let first = registry.detect("Soup\nBoil water.", &context).map(|p| p.name().to_string());
        let second = registry.detect("Soup\nBoil water.", &context).map(|p| p.name().to_string());
        assert_eq!(first, second);
    }
}
