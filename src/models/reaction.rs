//! Reaction data structures.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One reaction emitted to the combined output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionRecord {
    /// Resolved name of the primary solvent
    #[serde(rename = "solvent")]
    pub primary_solvent_name: Option<String>,

    /// Reactant SMILES in source order
    #[serde(rename = "reactant_smiles")]
    pub reactant_structures: Vec<String>,

    /// Primary solvent SMILES (zero or one entry)
    #[serde(rename = "solvent_smiles")]
    pub solvent_structures: Vec<String>,

    /// Product SMILES in source order
    #[serde(rename = "product_smiles")]
    pub product_structures: Vec<String>,
}

/// A raw reaction string split into its three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReaction {
    /// The raw `reactants>agents>products` string
    pub smiles: String,
    pub reactants: Vec<String>,
    pub solvents: Vec<String>,
    pub products: Vec<String>,
    /// Listing page the string was found on
    pub page_url: Option<String>,
}

impl ParsedReaction {
    /// Split a reaction string of the form `reactants>agents>products`.
    ///
    /// Missing trailing fields are treated as empty; anything after the third
    /// field is ignored.
    pub fn parse(raw: &str) -> Self {
        let mut fields = raw.split('>');
        let mut next_field = || split_structures(fields.next().unwrap_or(""));

        let reactants = next_field();
        let solvents = next_field();
        let products = next_field();

        Self {
            smiles: raw.to_string(),
            reactants,
            solvents,
            products,
            page_url: None,
        }
    }

    /// Attach the page URL the reaction came from.
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }
}

fn split_structures(field: &str) -> Vec<String> {
    field
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Structured fields read from a reaction detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailFields {
    pub reactant_structures: Vec<String>,
    pub solvents: Vec<String>,
    pub product_structures: Vec<String>,
    pub product_name: Option<String>,
}

impl DetailFields {
    /// Build the final sorted, de-duplicated fields from collected values.
    pub fn from_collected(
        reactants: Vec<String>,
        solvents: Vec<String>,
        products: Vec<String>,
        product_names: Vec<String>,
    ) -> Self {
        Self {
            reactant_structures: sorted_unique(reactants),
            solvents: sorted_unique(solvents),
            product_structures: sorted_unique(products),
            product_name: product_names.into_iter().next(),
        }
    }
}

fn sorted_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
