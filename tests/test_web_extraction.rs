#[cfg(test)]
mod tests {
    use recipe_ingest::parsers::{SiteSpec, WebRecipeParser};
    use recipe_ingest::{ParserContext, ParserRegistry, RecipeParser};

    #[test]
    fn test_json_ld_page() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <script type="application/ld+json">
                {
                    "@context": "https://schema.org",
                    "@graph": [
                        {"@type": "WebPage", "name": "Shakshuka | Food Blog"},
                        {
                            "@type": "Recipe",
                            "name": "Shakshuka",
                            "image": ["/uploads/shakshuka.jpg"],
                            "author": {"@type": "Person", "name": "Dana"},
                            "prepTime": "PT10M",
                            "cookTime": "PT20M",
                            "recipeYield": "4",
                            "recipeIngredient": ["6 eggs", "1 can (28 oz) crushed tomatoes", "1 tsp cumin"],
                            "recipeInstructions": [
                                {"@type": "HowToStep", "text": "Simmer the tomatoes with the cumin for 10 minutes."},
                                {"@type": "HowToStep", "text": "Crack in the eggs, cover and cook until set."}
                            ]
                        }
                    ]
                }
                </script>
            </head>
            <body><h1>Shakshuka</h1></body>
            </html>
        "#;
        let context = ParserContext::new().with_source_url("https://blog.example/shakshuka");
        let recipes = ParserRegistry::default().parse(html, &context).unwrap();
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert_eq!(recipe.name, "Shakshuka");
        assert_eq!(recipe.author.as_deref(), Some("Dana"));
        assert_eq!(
            recipe.image_url.as_deref(),
            Some("https://blog.example/uploads/shakshuka.jpg")
        );
        assert_eq!(recipe.total_time_minutes, Some(30));
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[2].unit.as_deref(), Some("tsp"));
        assert_eq!(recipe.instructions[0].time_minutes, Some(10));
        assert_eq!(recipe.source_url.as_deref(), Some("https://blog.example/shakshuka"));
    }

    #[test]
    fn test_selector_fallback_with_entities() {
        let html = r#"
            <html>
            <head><meta property="og:title" content="Mac &amp; Cheese"></head>
            <body>
              <div class="recipe-ingredients">
                <ul>
                  <li>8 oz macaroni</li>
                  <li>2 cups cheddar, shredded</li>
                </ul>
              </div>
              <div class="recipe-instructions">
                <ol>
                  <li>Boil the macaroni for 8 minutes.</li>
                  <li>Stir in the cheese until melted.</li>
                </ol>
              </div>
            </body>
            </html>
        "#;
        let recipes = WebRecipeParser::default()
            .parse(html, &ParserContext::new())
            .unwrap();
        let recipe = &recipes[0];

        assert_eq!(recipe.name, "Mac & Cheese");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1].preparation.as_deref(), Some("shredded"));
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.instructions[0].time_minutes, Some(8));
    }

    #[test]
    fn test_page_without_recipe_gives_one_placeholder() {
        let html = "<html><head><title>Contact</title></head><body><p>Write to us.</p></body></html>";
        let context = ParserContext::new().with_source_url("https://example.com/contact");
        let recipes = ParserRegistry::default().parse(html, &context).unwrap();

        assert_eq!(recipes.len(), 1);
        assert!(!recipes[0].name.is_empty());
        assert_eq!(recipes[0].source_url.as_deref(), Some("https://example.com/contact"));
        assert!(recipes[0].ingredients.is_empty());
        assert!(recipes[0].instructions.is_empty());
    }

    #[test]
    fn test_site_label_on_site_recipe() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "Recipe", "name": "Roast Chicken", "recipeIngredient": ["1 whole chicken"]}
            </script></head><body></body></html>"#;
        let context = ParserContext::new().with_source_url("https://www.simplyrecipes.com/roast-chicken/");
        let recipes = ParserRegistry::default().parse(html, &context).unwrap();
        assert_eq!(recipes[0].source.as_deref(), Some("simplyrecipes"));

        let custom = WebRecipeParser::for_site(SiteSpec::new("recipes.example", "example"), "Untitled");
        let context = ParserContext::new().with_source_url("https://recipes.example/chicken");
        assert!(custom.can_parse(html, &context));
        assert_eq!(custom.parse(html, &context).unwrap()[0].source.as_deref(), Some("example"));
    }
}
