#[cfg(test)]
mod tests {
    use recipe_ingest::ingredients::{clean_name, split_top_level};
    use recipe_ingest::{decompose, ParsedIngredientComponent};

    fn names(components: &[ParsedIngredientComponent]) -> Vec<&str> {
        components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_enriched_flour_label() {
        let label = "Enriched Wheat Flour (Wheat Flour, Niacin, Iron), Sugar, Salt";
        let result = decompose(label);

        assert_eq!(result.original_string, label);
        assert_eq!(result.components.len(), 3);
        assert_eq!(
            result.components.iter().map(|c| c.order_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let flour = &result.components[0];
        assert_eq!(flour.name, "Enriched Wheat Flour");
        assert_eq!(flour.children().len(), 3);
        assert!(flour.children().iter().all(|c| c.is_parenthetical));
        assert!(flour.base_ingredient_id.is_none());
    }

    #[test]
    fn test_realistic_bread_label() {
        let result = decompose(
            "INGREDIENTS: Unbleached Enriched Flour (Wheat Flour, Malted Barley Flour, Niacin, \
             Reduced Iron, Thiamin Mononitrate, Riboflavin, Folic Acid), Water, Sugar, \
             Contains 2% or less of: Yeast, Soybean Oil and/or Canola Oil, Salt, \
             Dough Conditioners (Sodium Stearoyl Lactylate, Ascorbic Acid)*, Calcium Propionate \
             (Preservative).",
        );

        assert_eq!(
            names(&result.components),
            vec![
                "Unbleached Enriched Flour",
                "Water",
                "Sugar",
                "Yeast",
                "Soybean Oil and/or Canola Oil",
                "Salt",
                "Dough Conditioners",
                "Calcium Propionate",
            ]
        );
        assert_eq!(result.components[0].children().len(), 7);
        assert_eq!(
            names(result.components[6].children()),
            vec!["Sodium Stearoyl Lactylate", "Ascorbic Acid"]
        );
        assert_eq!(names(result.components[7].children()), vec!["Preservative"]);
    }

    #[test]
    fn test_depth_first_order() {
        let result = decompose("A (B (C, D), E), F");
        let order: Vec<_> = result.depth_first().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_name_cleaning() {
        assert_eq!(clean_name("Natural Flavor*"), "Natural Flavor");
        assert_eq!(clean_name("Corn Syrup and/or"), "Corn Syrup");
        assert_eq!(clean_name("Salt (<2%)"), "Salt");
        assert_eq!(clean_name("Color (1%)"), "Color");
    }

    /// Deterministic pseudo-random labels with balanced nesting.
    fn generated_labels() -> Vec<String> {
        let words = ["Salt", "Sugar", "Wheat Flour", "Oil", "Iron", "Niacin"];
        let mut seed: u64 = 42;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };

        fn build(depth: u32, words: &[&str], next: &mut dyn FnMut(u64) -> u64) -> String {
            let count = 1 + next(4) as usize;
            let mut parts = Vec::new();
            for _ in 0..count {
                let word = words[next(words.len() as u64) as usize];
                if depth < 3 && next(3) == 0 {
                    parts.push(format!("{} ({})", word, build(depth + 1, words, next)));
                } else {
                    parts.push(word.to_string());
                }
            }
            let separator = if next(2) == 0 { ", " } else { "," };
            parts.join(separator)
        }

        (0..200).map(|_| build(0, &words, &mut next)).collect()
    }

    fn depth_at(text: &str) -> Vec<usize> {
        let mut depth = 0usize;
        text.chars()
            .map(|c| {
                match c {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                depth
            })
            .collect()
    }

    #[test]
    fn test_split_never_breaks_parentheses() {
        for label in generated_labels() {
            let tokens = split_top_level(&label);
            assert_eq!(tokens.join(","), label);
            for token in &tokens {
                let depths = depth_at(token);
                assert_eq!(depths.last().copied().unwrap_or(0), 0, "unbalanced token in {label}");
                assert_eq!(
                    token.matches('(').count(),
                    token.matches(')').count(),
                    "token {token:?} of {label}"
                );
            }
        }
    }

    #[test]
    fn test_generated_labels_decompose_to_trees() {
        for label in generated_labels() {
            let result = decompose(&label);
            let top_level = split_top_level(&label).len();
            assert_eq!(result.components.len(), top_level, "{label}");
            for component in result.depth_first() {
                assert!(!component.name.is_empty());
                assert!(!component.name.contains(['(', ')', ',']));
            }
        }
    }
}
