//! Curated structure-to-name tables.

use async_trait::async_trait;

use super::NameStrategy;
use crate::error::Result;

/// Compounds from the default publication that remote services name poorly.
const KNOWN_COMPOUNDS: &[(&str, &str)] = &[
    (
        r"C(C)(=O)OC\C=C(/C)\CC\C=C(/C)\CCC=C(C)C",
        "(2E,6E)-Farnesyl Acetate",
    ),
    (
        r"C(C)(=O)OC\C=C(\CC\C=C(\CC\C=C(\C=O)/C)/C)/C",
        "(2E,6E,10E)-12-oxo-3,7,11-trimethyldodeca-2,6,10-trien-1-yl acetate",
    ),
    (
        r"C(C)(=O)OC\C=C(\CC\C=C(\CC\C=C(\CO)/C)/C)/C",
        "(2E,6E,10E)-12-Hydroxy-3,7,11-trimethyldodeca-2,6,10-trien-1-yl acetate",
    ),
    (
        r"C(C)(=O)OC\C=C(\CC\C=C(\CCC1OC1(C)CO)/C)/C",
        "(2E,6E)-9-(3-(Hydroxymethyl)-3-methyloxiran-2-yl)-3,7-dimethylnona-2,6-dien-1-yl acetate",
    ),
    (
        r"C(C1=CC=CC=C1)(=O)OC[C@@]1(O[C@H]1CC\C(=C\CC\C(=C\COC(C)=O)\C)\C)C",
        concat!(
            "((2S,3S)-3-((3E,7E)-9-Acetoxy-3,7-dimethylnona-3,7-dien-1-yl)",
            "-2-methyloxiran-2-yl)methyl benzoate",
        ),
    ),
];

/// Common solvents with their display names.
const PREFERRED_SOLVENTS: &[(&str, &str)] = &[
    ("ClCCl", "dichloromethane"),
    ("CO[H]", "methanol"),
    ("C1CCCO1", "tetrahydrofuran"),
    ("CC(=O)C", "acetone"),
    ("CC#N", "acetonitrile"),
    ("CCOCC", "diethyl ether"),
    ("C1(=CC=CC=C1)C", "toluene"),
    ("O", "water"),
];

/// Strip double-bond direction markers (`/` and `\`) from a SMILES string.
pub fn normalize(smiles: &str) -> String {
    smiles.chars().filter(|c| !matches!(c, '/' | '\\')).collect()
}

/// Display name of a solvent in the preferred table, matched exactly.
pub fn preferred_solvent_name(smiles: &str) -> Option<&'static str> {
    PREFERRED_SOLVENTS
        .iter()
        .find(|(key, _)| *key == smiles)
        .map(|(_, name)| *name)
}

/// Resolves names from a static table, tolerating stereo marker variants.
#[derive(Debug, Clone)]
pub struct DictionaryStrategy {
    entries: Vec<(String, String)>,
}

impl DictionaryStrategy {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Dictionary seeded with the curated compound table.
    pub fn known_compounds() -> Self {
        Self::new(
            KNOWN_COMPOUNDS
                .iter()
                .map(|(smiles, name)| (smiles.to_string(), name.to_string())),
        )
    }

    pub fn lookup(&self, smiles: &str) -> Option<&str> {
        let normalized = normalize(smiles);
        self.entries
            .iter()
            .find(|(key, _)| key == smiles || normalize(key) == normalized)
            .map(|(_, name)| name.as_str())
    }
}

impl Default for DictionaryStrategy {
    fn default() -> Self {
        Self::known_compounds()
    }
}

#[async_trait]
impl NameStrategy for DictionaryStrategy {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn attempt(&self, structure: &str) -> Result<Option<String>> {
        Ok(self.lookup(structure).map(str::to_string))
    }
}
