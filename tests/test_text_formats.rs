#[cfg(test)]
mod tests {
    use recipe_ingest::model::TemperatureUnit;
    use recipe_ingest::{parse_recipes, ParserContext};

    #[test]
    fn test_meal_master_file_with_two_recipes() {
        let content = "\
MMMMM----- Recipe via Meal-Master (tm) v8.05

      Title: Garlic Butter
 Categories: Sauces
      Yield: 8 servings

      1/2 c  Butter, softened
      2      Garlic cloves
             -minced

  Beat the butter until fluffy and fold in the garlic.

MMMMM

MMMMM----- Recipe via Meal-Master (tm) v8.05

      Title: Herb Rice
      Yield: 4 servings

      1 c    Rice
      2 c    Water
      1 ts   Dried thyme

  Bring the water to a boil and stir in the rice and thyme.
  Cover and simmer for 18 minutes, then fluff with a fork.

MMMMM
";
        let recipes = parse_recipes(content, &ParserContext::new()).unwrap();
        assert_eq!(recipes.len(), 2);

        let butter = &recipes[0];
        assert_eq!(butter.name, "Garlic Butter");
        assert_eq!(butter.categories, vec!["Sauces"]);
        assert_eq!(butter.servings, Some(8));
        assert_eq!(butter.ingredients[0].preparation.as_deref(), Some("softened"));
        assert_eq!(butter.ingredients[1].preparation.as_deref(), Some("minced"));

        let rice = &recipes[1];
        assert_eq!(rice.name, "Herb Rice");
        assert_eq!(rice.ingredients.len(), 3);
        assert_eq!(rice.ingredients[2].unit.as_deref(), Some("tsp"));
        assert_eq!(rice.instructions.len(), 2);
        assert_eq!(rice.instructions[1].step_number, 2);
        assert_eq!(rice.instructions[1].time_minutes, Some(18));
    }

    #[test]
    fn test_xml_export() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<recipes>
  <recipe>
    <title>Roasted Carrots</title>
    <description>Sweet &amp; simple.</description>
    <servings>4</servings>
    <ingredients>
      <ingredient>1 lb carrots, peeled</ingredient>
      <ingredient>2 tbsp olive oil</ingredient>
    </ingredients>
    <instructions>
      <step>Toss the carrots with the oil.</step>
      <step>Roast at 220°C for 25 minutes.</step>
    </instructions>
  </recipe>
</recipes>"#;
        let recipes = parse_recipes(content, &ParserContext::new()).unwrap();
        let recipe = &recipes[0];

        assert_eq!(recipe.name, "Roasted Carrots");
        assert_eq!(recipe.description.as_deref(), Some("Sweet & simple."));
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("lb"));
        assert_eq!(recipe.ingredients[0].preparation.as_deref(), Some("peeled"));
        assert_eq!(recipe.instructions[1].temperature, Some(220));
        assert_eq!(recipe.instructions[1].temperature_unit, Some(TemperatureUnit::C));
        assert_eq!(recipe.instructions[1].time_minutes, Some(25));
    }

    #[test]
    fn test_broken_xml_is_recovered() {
        let content = r#"<?xml version="1.0"?><recipe><title>Oops</title><ingredients>"#;
        let recipes = parse_recipes(content, &ParserContext::new()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0]
            .description
            .as_deref()
            .is_some_and(|d| d.starts_with("Failed to parse XML")));
        assert!(recipes[0].is_empty());
    }

    #[test]
    fn test_free_text_recipe() {
        let content = "\
Lemonade

Serves 6

Ingredients:
1 cup sugar
1 cup lemon juice
5 cups cold water

Directions:
1. Stir the sugar into one cup of hot water until dissolved.
2. Add the lemon juice and the cold water and chill.
";
        let context = ParserContext::new().with_file_name("lemonade.txt");
        let recipes = parse_recipes(content, &context).unwrap();
        let recipe = &recipes[0];

        assert_eq!(recipe.name, "Lemonade");
        assert_eq!(recipe.servings, Some(6));
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[2].quantity, Some(5.0));
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(
            recipe.instructions[1].instruction_text,
            "Add the lemon juice and the cold water and chill."
        );
    }
}
