// src/services/details.rs

//! Reaction detail page parser.
//!
//! Detail pages use inconsistent markup, so fields are read in layers:
//! key/value table rows, then `dl` term/description pairs, then a
//! `SMILES: <value>` scan over the page text. A layer that finds nothing is
//! not an error.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::DetailFields;
use crate::utils::html::{joined_text, stripped_strings};

static SMILES_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SMILES\s*[:=]\s*(\S+)").expect("valid SMILES regex"));

/// Placeholder label some cells repeat next to the structure.
const SMILES_LABEL: &str = "SMILES";

/// Which detail field a row key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Reactants,
    Solvents,
    Products,
    ProductName,
}

impl FieldKind {
    /// Classify a lowercased row key by substring.
    fn classify(key: &str) -> Option<Self> {
        let reactant = key.contains("reactant");
        let product = key.contains("product");
        if reactant && key.contains("smiles") {
            Some(Self::Reactants)
        } else if reactant && key.contains("solvent") {
            Some(Self::Solvents)
        } else if product && key.contains("smiles") {
            Some(Self::Products)
        } else if product && (key.contains("name") || key == "product") {
            Some(Self::ProductName)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct Collected {
    reactants: Vec<String>,
    solvents: Vec<String>,
    products: Vec<String>,
    product_names: Vec<String>,
}

impl Collected {
    fn push(&mut self, kind: FieldKind, values: Vec<String>) {
        let values = values.into_iter().filter(|v| !v.is_empty());
        match kind {
            FieldKind::Reactants => self
                .reactants
                .extend(values.filter(|v| v != SMILES_LABEL)),
            FieldKind::Solvents => self.solvents.extend(values),
            FieldKind::Products => self.products.extend(values.filter(|v| v != SMILES_LABEL)),
            FieldKind::ProductName => self.product_names.extend(values),
        }
    }

    fn add_pair(&mut self, key_cell: ElementRef<'_>, value_cell: ElementRef<'_>) {
        let key = joined_text(key_cell, " ").to_lowercase();
        if let Some(kind) = FieldKind::classify(&key) {
            self.push(kind, stripped_strings(value_cell));
        }
    }

    fn any_structure_missing(&self) -> bool {
        self.reactants.is_empty() || self.solvents.is_empty() || self.products.is_empty()
    }
}

/// Parses structured fields from reaction detail pages.
pub struct PageParser {
    table: Selector,
    row: Selector,
    cell: Selector,
    list: Selector,
}

impl PageParser {
    pub fn new() -> Self {
        Self {
            table: parse_selector("table"),
            row: parse_selector("tr"),
            cell: parse_selector("th, td"),
            list: parse_selector("dl"),
        }
    }

    /// Read reactants, solvents, products and product name from a page.
    pub fn parse_details(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);
        let mut collected = Collected::default();

        self.scan_tables(&document, &mut collected);

        if collected.any_structure_missing() {
            self.scan_definition_lists(&document, &mut collected);
        }

        if collected.reactants.is_empty() {
            let text = stripped_strings(document.root_element()).join("\n");
            collected.reactants.extend(
                SMILES_TEXT
                    .captures_iter(&text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        }

        DetailFields::from_collected(
            collected.reactants,
            collected.solvents,
            collected.products,
            collected.product_names,
        )
    }

    fn scan_tables(&self, document: &Html, collected: &mut Collected) {
        for table in document.select(&self.table) {
            for row in table.select(&self.row) {
                let mut cells = row.select(&self.cell);
                if let (Some(key), Some(value)) = (cells.next(), cells.next()) {
                    collected.add_pair(key, value);
                }
            }
        }
    }

    /// Walk `dl` element children two at a time as (`dt`, `dd`) pairs.
    fn scan_definition_lists(&self, document: &Html, collected: &mut Collected) {
        for list in document.select(&self.list) {
            let items: Vec<ElementRef<'_>> =
                list.children().filter_map(ElementRef::wrap).collect();
            for pair in items.chunks_exact(2) {
                let (term, description) = (pair[0], pair[1]);
                if term.value().name() != "dt" || description.value().name() != "dd" {
                    continue;
                }
                collected.add_pair(term, description);
            }
        }
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_selector(s: &str) -> Selector {
    Selector::parse(s).expect("valid static selector")
}
