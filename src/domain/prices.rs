//! Price-block extraction from a single payload object.
//!
//! Three layouts are recognized, tried in order, first success wins:
//! flat canonical fields, separate nested purchase/rental objects, and a
//! combined price object holding both.

use serde_json::{Map, Value};

use crate::util::numeric::coerce_value;

/// Synonyms for a nested purchase object, in priority order.
pub const PURCHASE_KEYS: [&str; 5] = ["acquisto", "vendita", "compravendita", "purchase", "sale"];
/// Synonyms for a nested rental object, in priority order.
pub const RENTAL_KEYS: [&str; 4] = ["affitto", "locazione", "rental", "lease"];
/// Synonyms for a combined price object holding purchase/rental sub-objects.
pub const COMBINED_KEYS: [&str; 4] = ["prezzi", "prezzo", "price", "prices"];
/// One further wrapping level tolerated inside purchase/rental objects.
pub const VALUES_KEYS: [&str; 2] = ["values", "valori"];

const MIN_KEYS: [&str; 4] = ["min", "minimo", "prezzo_min", "valore_min"];
const MAX_KEYS: [&str; 4] = ["max", "massimo", "prezzo_max", "valore_max"];
const MEDIAN_KEYS: [&str; 7] = [
    "medio",
    "media",
    "median",
    "prezzo_medio",
    "valore_medio",
    "avg",
    "average",
];

/// Condition descriptor synonyms, independent of the price layout.
pub const CONDITION_KEYS: [&str; 5] = [
    "stato_di_conservazione_mediano_della_zona",
    "stato_conservazione",
    "conservazione",
    "condition",
    "stato",
];

/// Price figures extracted from one object node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceBlock {
    pub purchase_min: Option<f64>,
    pub purchase_median: Option<f64>,
    pub purchase_max: Option<f64>,
    pub rental_min: Option<f64>,
    pub rental_median: Option<f64>,
    pub rental_max: Option<f64>,
    pub condition: Option<String>,
}

impl PriceBlock {
    pub fn has_prices(&self) -> bool {
        [
            self.purchase_min,
            self.purchase_median,
            self.purchase_max,
            self.rental_min,
            self.rental_median,
            self.rental_max,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// Returns the price block carried by `map`, or `None` when no recognizable
/// price data is present. The condition descriptor is attached only to a
/// returned block.
pub fn extract_price_block(map: &Map<String, Value>) -> Option<PriceBlock> {
    let mut block = flat_block(map)
        .or_else(|| nested_block(map))
        .or_else(|| combined_block(map))?;
    block.condition = condition_of(map);
    Some(block)
}

/// Policy 1: the canonical flat field names the observatory itself uses.
fn flat_block(map: &Map<String, Value>) -> Option<PriceBlock> {
    let block = PriceBlock {
        purchase_min: field(map, "prezzo_acquisto_min"),
        purchase_median: field(map, "prezzo_acquisto_medio"),
        purchase_max: field(map, "prezzo_acquisto_max"),
        rental_min: field(map, "prezzo_affitto_min"),
        rental_median: field(map, "prezzo_affitto_medio"),
        rental_max: field(map, "prezzo_affitto_max"),
        condition: None,
    };
    block.has_prices().then_some(block)
}

/// Policy 2: nested purchase and/or rental objects beside each other.
fn nested_block(map: &Map<String, Value>) -> Option<PriceBlock> {
    let purchase = first_object(map, &PURCHASE_KEYS).and_then(figures_of);
    let rental = first_object(map, &RENTAL_KEYS).and_then(figures_of);
    if purchase.is_none() && rental.is_none() {
        return None;
    }

    let purchase = purchase.unwrap_or_default();
    let rental = rental.unwrap_or_default();
    let block = PriceBlock {
        purchase_min: purchase.min,
        purchase_median: purchase.median,
        purchase_max: purchase.max,
        rental_min: rental.min,
        rental_median: rental.median,
        rental_max: rental.max,
        condition: None,
    };
    block.has_prices().then_some(block)
}

/// Policy 3: a combined price object wrapping the purchase/rental pair.
fn combined_block(map: &Map<String, Value>) -> Option<PriceBlock> {
    first_object(map, &COMBINED_KEYS).and_then(nested_block)
}

#[derive(Clone, Copy, Debug, Default)]
struct Figures {
    min: Option<f64>,
    median: Option<f64>,
    max: Option<f64>,
}

/// Shared sub-routine for one operation object: min/max/median under their
/// synonym keys, directly or one level down under a values wrapper.
fn figures_of(map: &Map<String, Value>) -> Option<Figures> {
    if let Some(figures) = figures_at(map) {
        return Some(figures);
    }
    first_object(map, &VALUES_KEYS).and_then(figures_at)
}

fn figures_at(map: &Map<String, Value>) -> Option<Figures> {
    let figures = Figures {
        min: lookup(map, &MIN_KEYS),
        median: lookup(map, &MEDIAN_KEYS),
        max: lookup(map, &MAX_KEYS),
    };
    (figures.min.is_some() || figures.median.is_some() || figures.max.is_some()).then_some(figures)
}

fn condition_of(map: &Map<String, Value>) -> Option<String> {
    CONDITION_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    })
}

fn field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(coerce_value)
}

fn lookup(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| field(map, key))
}

fn first_object<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|key| map.get(*key).and_then(Value::as_object))
}
