//! Schema-tolerant quotation collection.
//!
//! The upstream payload is an unlabeled tree of zone -> category ->
//! price-block nesting whose wrapper depth and key names vary by endpoint.
//! A depth-first walk threads zone/category context downward and emits one
//! quotation per price-bearing node, which tolerates both the flat-map and
//! the array-of-objects variants without per-format branching.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};

use crate::domain::categories::normalize_category;
use crate::domain::entities::Quotation;
use crate::domain::prices::{
    extract_price_block, PriceBlock, COMBINED_KEYS, PURCHASE_KEYS, RENTAL_KEYS, VALUES_KEYS,
};
use crate::infra::envelope::WRAPPER_KEYS;

/// Zone-like field names, in priority order; first match wins.
pub const ZONE_KEYS: [&str; 5] = ["zona_omi", "zona", "zone", "zone_code", "codice_zona"];
/// Category-like field names, in priority order; first match wins.
pub const CATEGORY_KEYS: [&str; 5] = [
    "tipo_immobile",
    "categoria",
    "category",
    "property_type",
    "tipologia",
];

/// Everything the walk found: quotations in document order plus the distinct
/// zones that produced them, recorded before any filtering.
#[derive(Clone, Debug, Default)]
pub struct CollectedQuotations {
    pub quotations: Vec<Quotation>,
    pub zones: BTreeSet<String>,
}

#[derive(Clone, Copy, Default)]
struct Context<'a> {
    zone: Option<&'a str>,
    category: Option<&'a str>,
}

/// Walks the unwrapped payload and returns the matching quotations.
///
/// Filters are applied after collection, so the zone set always reflects the
/// full payload.
pub fn collect_quotations(
    payload: &Value,
    zone_filter: Option<&str>,
    category_filter: Option<&str>,
) -> CollectedQuotations {
    let mut collected = CollectedQuotations::default();
    let mut visited: HashSet<*const Value> = HashSet::new();
    visit(payload, Context::default(), &mut visited, &mut collected);

    if let Some(zone) = zone_filter {
        collected.quotations.retain(|quotation| quotation.zone == zone);
    }
    if let Some(category) = category_filter {
        collected.quotations.retain(|quotation| quotation.category == category);
    }
    collected
}

fn visit<'a>(
    value: &'a Value,
    ctx: Context<'a>,
    visited: &mut HashSet<*const Value>,
    out: &mut CollectedQuotations,
) {
    // Identity-based cycle guard: a node address is never revisited, while
    // structurally identical subtrees at different addresses still are.
    if !visited.insert(value as *const Value) {
        return;
    }

    match value {
        Value::Object(map) => visit_object(map, ctx, visited, out),
        Value::Array(items) => {
            for item in items {
                visit(item, ctx, visited, out);
            }
        }
        _ => {}
    }
}

fn visit_object<'a>(
    map: &'a Map<String, Value>,
    mut ctx: Context<'a>,
    visited: &mut HashSet<*const Value>,
    out: &mut CollectedQuotations,
) {
    let zone_label = explicit_label(map, &ZONE_KEYS);
    let category_label = explicit_label(map, &CATEGORY_KEYS);
    if let Some((_, zone)) = zone_label {
        ctx.zone = Some(zone);
    }
    if let Some((_, category)) = category_label {
        ctx.category = Some(category);
    }

    let mut emitted = false;
    if let Some(block) = extract_price_block(map) {
        if let Some(zone) = ctx.zone {
            out.zones.insert(zone.to_string());
            out.quotations.push(quotation_from(zone, ctx.category, block));
            emitted = true;
        }
    }

    for (key, child) in map {
        if !child.is_object() && !child.is_array() {
            continue;
        }
        // A label consumed as context is not reprocessed as a nested
        // structure, and neither are the price objects already folded into an
        // emitted quotation.
        let consumed_as_label = zone_label.map(|(name, _)| name == key.as_str()).unwrap_or(false)
            || category_label.map(|(name, _)| name == key.as_str()).unwrap_or(false);
        if consumed_as_label || (emitted && is_price_source_key(key)) {
            continue;
        }
        visit(child, child_context(key, ctx), visited, out);
    }
}

/// Context inherited by a child container: an unreserved key becomes the zone
/// when none is set yet, then the category. This is what turns the flat
/// {"B12": {"abitazioni_civili": {...}}} shape into labeled quotations.
fn child_context<'a>(key: &'a str, ctx: Context<'a>) -> Context<'a> {
    if is_reserved_key(key) {
        return ctx;
    }
    match (ctx.zone, ctx.category) {
        (None, _) => Context { zone: Some(key), ..ctx },
        (Some(_), None) => Context { category: Some(key), ..ctx },
        _ => ctx,
    }
}

fn is_reserved_key(key: &str) -> bool {
    WRAPPER_KEYS.contains(&key)
        || ZONE_KEYS.contains(&key)
        || CATEGORY_KEYS.contains(&key)
        || VALUES_KEYS.contains(&key)
        || is_price_source_key(key)
}

fn is_price_source_key(key: &str) -> bool {
    PURCHASE_KEYS.contains(&key) || RENTAL_KEYS.contains(&key) || COMBINED_KEYS.contains(&key)
}

/// First key of `keys` holding a non-empty string value.
fn explicit_label<'a>(
    map: &'a Map<String, Value>,
    keys: &'static [&'static str],
) -> Option<(&'static str, &'a str)> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some((*key, text.trim())),
        _ => None,
    })
}

fn quotation_from(zone: &str, category: Option<&str>, block: PriceBlock) -> Quotation {
    Quotation {
        zone: zone.to_string(),
        category: normalize_category(category.unwrap_or(""), ""),
        condition: block.condition,
        purchase_min: block.purchase_min,
        purchase_median: block.purchase_median,
        purchase_max: block.purchase_max,
        rental_min: block.rental_min,
        rental_median: block.rental_median,
        rental_max: block.rental_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_map_emits_one_quotation_per_category() {
        let payload = json!({
            "B1": {
                "abitazioni_civili": {"prezzo_acquisto_min": 1800, "prezzo_acquisto_max": 2400},
                "negozi": {"prezzo_affitto_min": "10,5"}
            }
        });
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations.len(), 2);
        assert!(collected.quotations.iter().all(|q| q.zone == "B1"));
        assert_eq!(collected.zones.len(), 1);

        let shops = collected
            .quotations
            .iter()
            .find(|q| q.category == "negozi")
            .unwrap();
        assert_eq!(shops.rental_min, Some(10.5));
    }

    #[test]
    fn all_null_price_fields_emit_nothing() {
        let payload = json!({
            "B1": {
                "abitazioni_civili": {
                    "prezzo_acquisto_min": null,
                    "prezzo_affitto_max": null
                }
            }
        });
        let collected = collect_quotations(&payload, None, None);
        assert!(collected.quotations.is_empty());
        assert!(collected.zones.is_empty());
    }

    #[test]
    fn array_of_objects_with_explicit_labels() {
        let payload = json!([
            {"zona": "B1", "tipo_immobile": "Negozi", "prezzo_acquisto_medio": 3000},
            {"zona": "C1", "tipo_immobile": "uffici", "prezzo_affitto_medio": 12}
        ]);
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations.len(), 2);
        assert_eq!(collected.quotations[0].zone, "B1");
        assert_eq!(collected.quotations[0].category, "negozi");
        assert_eq!(collected.quotations[1].category, "uffici");
        assert_eq!(collected.zones.len(), 2);
    }

    #[test]
    fn zone_filter_drops_other_zones() {
        let payload = json!({
            "B1": {"negozi": {"prezzo_acquisto_min": 1}},
            "C1": {"negozi": {"prezzo_acquisto_min": 2}},
            "D1": {"negozi": {"prezzo_acquisto_min": 3}}
        });
        let collected = collect_quotations(&payload, Some("C1"), None);
        assert_eq!(collected.quotations.len(), 1);
        assert_eq!(collected.quotations[0].zone, "C1");
        // The zone count stays a property of the payload, not of the filter.
        assert_eq!(collected.zones.len(), 3);
    }

    #[test]
    fn category_filter_matches_canonical_tokens() {
        let payload = json!({
            "B1": {
                "abitazioni_civili": {"prezzo_acquisto_min": 1},
                "negozi": {"prezzo_acquisto_min": 2}
            }
        });
        let collected = collect_quotations(&payload, None, Some("negozi"));
        assert_eq!(collected.quotations.len(), 1);
        assert_eq!(collected.quotations[0].category, "negozi");
    }

    #[test]
    fn explicit_zone_key_overrides_derived_context() {
        let payload = json!({
            "ignored_label": {
                "zona_omi": "D5",
                "categoria": "box",
                "acquisto": {"min": 500, "max": 800}
            }
        });
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations.len(), 1);
        assert_eq!(collected.quotations[0].zone, "D5");
        assert_eq!(collected.quotations[0].category, "box");
        assert_eq!(collected.quotations[0].purchase_min, Some(500.0));
    }

    #[test]
    fn nested_price_objects_do_not_double_emit() {
        let payload = json!({
            "B1": {
                "negozi": {
                    "prezzi": {
                        "acquisto": {"min": 1000},
                        "affitto": {"min": 5}
                    }
                }
            }
        });
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations.len(), 1);
        assert_eq!(collected.quotations[0].purchase_min, Some(1000.0));
        assert_eq!(collected.quotations[0].rental_min, Some(5.0));
    }

    #[test]
    fn price_block_without_zone_context_is_dropped() {
        let payload = json!({"prezzo_acquisto_min": 1000});
        let collected = collect_quotations(&payload, None, None);
        assert!(collected.quotations.is_empty());
    }

    #[test]
    fn category_labels_are_normalized_on_emission() {
        let payload = json!({
            "B1": {"Abitazioni Civili!": {"prezzo_acquisto_min": 100}}
        });
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations[0].category, "abitazioni_civili");
    }

    #[test]
    fn condition_travels_with_the_quotation() {
        let payload = json!({
            "C3": {
                "uffici": {
                    "prezzo_acquisto_medio": 2500,
                    "stato_di_conservazione_mediano_della_zona": "ottimo"
                }
            }
        });
        let collected = collect_quotations(&payload, None, None);
        assert_eq!(collected.quotations[0].condition.as_deref(), Some("ottimo"));
    }
}
