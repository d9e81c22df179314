//! Ingredient-label decomposition and taxonomy resolution.
//!
//! A label such as `"Enriched Wheat Flour (Wheat Flour, Niacin), Salt"` is
//! first split into an owned component tree ([`decompose`]), then every node
//! is matched against a [`TaxonomyRepository`] by an [`EntityResolver`], and
//! finally the matches can be written back with [`link_components`].

mod decomposer;
mod linker;
mod resolver;
mod taxonomy;

pub use self::decomposer::{clean_name, decompose, split_top_level};
pub use self::linker::{link_components, LinkReport};
pub use self::resolver::{EntityResolver, TaxonomyMatch};
pub use self::taxonomy::{ComponentLink, InMemoryTaxonomy, LinkId, TaxonomyRepository};
