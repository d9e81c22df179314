use log::{debug, info, warn};
use serde::Serialize;

use super::taxonomy::{ComponentLink, TaxonomyRepository};
use crate::model::{ParsedIngredientComponent, ParsedIngredientResult};

/// Outcome of one best-effort linking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub linked: usize,
    pub failed: usize,
    pub unresolved: usize,
}

fn plan_links(
    parent_ingredient_id: i64,
    result: &ParsedIngredientResult,
) -> (Vec<ComponentLink>, usize) {
    fn nested(
        parent_ingredient_id: i64,
        parent: &ParsedIngredientComponent,
        next_index: &mut i32,
        links: &mut Vec<ComponentLink>,
        unresolved: &mut usize,
    ) {
        for child in parent.children() {
            match child.base_ingredient_id {
                Some(base_ingredient_id) => {
                    links.push(ComponentLink {
                        parent_ingredient_id,
                        base_ingredient_id,
                        order_index: *next_index,
                        is_main: false,
                        notes: Some(format!("Part of {}", parent.name)),
                    });
                    *next_index += 1;
                }
                None => *unresolved += 1,
            }
            nested(parent_ingredient_id, child, next_index, links, unresolved);
        }
    }

    let mut links = Vec::new();
    let mut unresolved = 0;

    for (position, component) in result.components.iter().enumerate() {
        match component.base_ingredient_id {
            Some(base_ingredient_id) => links.push(ComponentLink {
                parent_ingredient_id,
                base_ingredient_id,
                order_index: component.order_index,
                is_main: position == 0,
                notes: None,
            }),
            None => unresolved += 1,
        }
    }

    // nested components sort after every top-level one
    let mut next_index = result.components.len() as i32;
    for component in &result.components {
        nested(
            parent_ingredient_id,
            component,
            &mut next_index,
            &mut links,
            &mut unresolved,
        );
    }

    (links, unresolved)
}

/// Links every resolved component of `result` to `parent_ingredient_id`.
///
/// The first top-level component is the main one. Each write is
/// independent: a failure is logged and counted, never propagated.
pub async fn link_components(
    repository: &dyn TaxonomyRepository,
    parent_ingredient_id: i64,
    result: &ParsedIngredientResult,
) -> LinkReport {
    let (links, unresolved) = plan_links(parent_ingredient_id, result);
    let mut report = LinkReport {
        unresolved,
        ..Default::default()
    };

    for link in links {
        let base_ingredient_id = link.base_ingredient_id;
        match repository.link_component(link).await {
            Ok(link_id) => {
                debug!(
                    "Linked base ingredient {} to {} as link {}",
                    base_ingredient_id, parent_ingredient_id, link_id
                );
                report.linked += 1;
            }
            Err(e) => {
                warn!(
                    "Skipping link of base ingredient {} to {}: {}",
                    base_ingredient_id, parent_ingredient_id, e
                );
                report.failed += 1;
            }
        }
    }

    info!(
        "Linked {} components to ingredient {} ({} failed, {} unresolved)",
        report.linked, parent_ingredient_id, report.failed, report.unresolved
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::InMemoryTaxonomy;

    fn component(name: &str, id: Option<i64>, order: i32) -> ParsedIngredientComponent {
        ParsedIngredientComponent {
            name: name.to_string(),
            base_ingredient_id: id,
            matched_name: id.map(|_| name.to_string()),
            order_index: order,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_link_policy() {
        let mut flour = component("Enriched Flour", Some(1), 0);
        flour.sub_components = Some(vec![
            component("Wheat Flour", Some(2), 0),
            component("Mystery", None, 1),
            component("Iron", Some(3), 2),
        ]);
        let result = ParsedIngredientResult {
            original_string: String::new(),
            components: vec![flour, component("Sugar", Some(4), 1), component("Salt", None, 2)],
        };

        let taxonomy = InMemoryTaxonomy::default();
        let report = link_components(&taxonomy, 99, &result).await;
        assert_eq!(
            report,
            LinkReport {
                linked: 4,
                failed: 0,
                unresolved: 2
            }
        );

        let links = taxonomy.links();
        let summary: Vec<_> = links
            .iter()
            .map(|l| (l.base_ingredient_id, l.order_index, l.is_main))
            .collect();
        assert_eq!(summary, vec![(1, 0, true), (4, 1, false), (2, 3, false), (3, 4, false)]);
        assert_eq!(links[2].notes.as_deref(), Some("Part of Enriched Flour"));
        assert!(links.iter().all(|l| l.parent_ingredient_id == 99));
    }

    #[tokio::test]
    async fn test_unresolved_first_component_is_not_main() {
        let result = ParsedIngredientResult {
            original_string: String::new(),
            components: vec![component("Unknown", None, 0), component("Sugar", Some(4), 1)],
        };
        let taxonomy = InMemoryTaxonomy::default();
        link_components(&taxonomy, 1, &result).await;
        let links = taxonomy.links();
        assert_eq!(links.len(), 1);
        assert!(!links[0].is_main);
    }
}
