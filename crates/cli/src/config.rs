//! `cgx.toml`: parse options plus types preloaded into the hierarchy.
//!
//! ```toml
//! [parse]
//! create_types_on_demand = false
//!
//! [[concept_types]]
//! label = "Animal"
//!
//! [[concept_types]]
//! label = "Cat"
//! parents = ["Animal"]
//!
//! [[relation_types]]
//! label = "On"
//! valence = 2
//! ```

use cgx_core::ParseOptions;
use cgx_model::{Handle, Hierarchy, Lattice};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CgxConfig {
    pub parse: ParseOptions,
    pub concept_types: Vec<ConceptTypeDecl>,
    pub relation_types: Vec<RelationTypeDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConceptTypeDecl {
    pub label: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RelationTypeDecl {
    pub label: String,
    #[serde(default)]
    pub valence: Option<usize>,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Read and parse a config file. Returns a human-readable error string on failure.
pub(crate) fn read_config(path: &Path) -> Result<CgxConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

impl CgxConfig {
    /// A hierarchy holding every declared type. Parents must be declared
    /// before the types beneath them.
    pub(crate) fn hierarchy(&self) -> Result<Hierarchy, String> {
        let mut h = Hierarchy::new();
        for decl in &self.concept_types {
            let parents = resolve(&h.concepts, &decl.label, &decl.parents)?;
            h.concepts
                .create(&decl.label, &parents, &[])
                .map_err(|e| e.to_string())?;
        }
        for decl in &self.relation_types {
            let parents = resolve(&h.relations, &decl.label, &decl.parents)?;
            match decl.valence {
                Some(valence) => h.declare_relation(&decl.label, valence, &parents),
                None => h.relations.create(&decl.label, &parents, &[]),
            }
            .map_err(|e| e.to_string())?;
        }
        Ok(h)
    }
}

fn resolve<K: Handle>(lattice: &Lattice<K>, child: &str, parents: &[String]) -> Result<Vec<K>, String> {
    parents
        .iter()
        .map(|p| {
            lattice
                .get(p)
                .ok_or_else(|| format!("type '{}' names undeclared parent '{}'", child, p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: CgxConfig = toml::from_str("").unwrap();
        assert_eq!(config.parse, ParseOptions::default());
        assert!(config.concept_types.is_empty());
    }

    #[test]
    fn declared_types_form_a_hierarchy() {
        let config: CgxConfig = toml::from_str(
            r#"
            [parse]
            max_depth = 16

            [[concept_types]]
            label = "Animal"

            [[concept_types]]
            label = "Cat"
            parents = ["Animal"]

            [[relation_types]]
            label = "On"
            valence = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.parse.max_depth, 16);
        assert!(config.parse.create_types_on_demand);

        let h = config.hierarchy().unwrap();
        let animal = h.concepts.get("Animal").unwrap();
        let cat = h.concepts.get("Cat").unwrap();
        assert!(h.concepts.is_subtype(cat, animal));
        let on = h.relations.get("On").unwrap();
        assert_eq!(h.relations.valence(on), Some(2));
    }

    #[test]
    fn undeclared_parent_is_reported() {
        let config: CgxConfig = toml::from_str(
            r#"
            [[concept_types]]
            label = "Cat"
            parents = ["Animal"]
            "#,
        )
        .unwrap();
        let err = config.hierarchy().unwrap_err();
        assert!(err.contains("Animal"), "{}", err);
    }
}
