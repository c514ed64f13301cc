//! Canonical OMI property categories and label normalization.

/// The closed set of category tokens the OMI observatory publishes.
pub const CANONICAL_CATEGORIES: [&str; 17] = [
    // Residential
    "abitazioni_civili",
    "ville_e_villini",
    "abitazioni_di_tipo_economico",
    "abitazioni_signorili",
    "abitazioni_tipiche_dei_luoghi",
    // Commercial
    "negozi",
    "uffici",
    "uffici_strutturati",
    "centri_commerciali",
    // Parking
    "box",
    "posti_auto_scoperti",
    "posti_auto_coperti",
    "autorimesse",
    // Industrial
    "capannoni_tipici",
    "capannoni_industriali",
    "magazzini",
    "laboratori",
];

/// Common Italian property descriptions mapped onto canonical categories.
const DESCRIPTION_MAPPING: [(&str, &str); 23] = [
    ("appartamento", "abitazioni_civili"),
    ("attico", "abitazioni_signorili"),
    ("villa", "ville_e_villini"),
    ("villino", "ville_e_villini"),
    ("villetta", "ville_e_villini"),
    ("casa indipendente", "abitazioni_civili"),
    ("monolocale", "abitazioni_civili"),
    ("bilocale", "abitazioni_civili"),
    ("trilocale", "abitazioni_civili"),
    ("quadrilocale", "abitazioni_civili"),
    ("negozio", "negozi"),
    ("locale commerciale", "negozi"),
    ("ufficio", "uffici"),
    ("centro commerciale", "centri_commerciali"),
    ("box", "box"),
    ("garage", "box"),
    ("posto auto", "posti_auto_coperti"),
    ("posto auto coperto", "posti_auto_coperti"),
    ("posto auto scoperto", "posti_auto_scoperti"),
    ("autorimessa", "autorimesse"),
    ("capannone", "capannoni_industriali"),
    ("magazzino", "magazzini"),
    ("laboratorio", "laboratori"),
];

pub fn is_canonical(token: &str) -> bool {
    CANONICAL_CATEGORIES.contains(&token)
}

/// Maps a free-text category label onto a canonical token.
///
/// Labels already in the canonical set pass through unchanged; anything else
/// is slugged deterministically so unrecognized upstream categories still
/// surface instead of silently vanishing. Empty input yields the fallback,
/// which may itself be empty.
pub fn normalize_category(label: &str, fallback: &str) -> String {
    let lowered = label.trim().to_lowercase();
    if lowered.is_empty() {
        return fallback.to_string();
    }
    if is_canonical(&lowered) {
        return lowered;
    }
    slugify(&lowered)
}

/// Collapses every run of non-alphanumeric characters into a single
/// underscore and trims the ends.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Resolves a human property description ("appartamento", "posto auto") to a
/// canonical category, defaulting to the most common one.
pub fn category_for_description(description: &str) -> &'static str {
    let lowered = description.trim().to_lowercase();
    DESCRIPTION_MAPPING
        .iter()
        .find(|(key, _)| *key == lowered)
        .map(|(_, category)| *category)
        .unwrap_or("abitazioni_civili")
}

/// Human-readable Italian name for a canonical category; unknown tokens are
/// returned as-is.
pub fn display_name(category: &str) -> &str {
    match category {
        "abitazioni_civili" => "Abitazioni civili",
        "ville_e_villini" => "Ville e villini",
        "abitazioni_di_tipo_economico" => "Abitazioni economiche",
        "abitazioni_signorili" => "Abitazioni signorili",
        "abitazioni_tipiche_dei_luoghi" => "Abitazioni tipiche",
        "negozi" => "Negozi",
        "uffici" => "Uffici",
        "uffici_strutturati" => "Uffici strutturati",
        "centri_commerciali" => "Centri commerciali",
        "box" => "Box",
        "posti_auto_scoperti" => "Posti auto scoperti",
        "posti_auto_coperti" => "Posti auto coperti",
        "autorimesse" => "Autorimesse",
        "capannoni_tipici" => "Capannoni tipici",
        "capannoni_industriali" => "Capannoni industriali",
        "magazzini" => "Magazzini",
        "laboratori" => "Laboratori",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_tokens_pass_through() {
        for token in CANONICAL_CATEGORIES {
            assert_eq!(normalize_category(token, ""), token);
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_category("Abitazioni Civili!", "");
        let twice = normalize_category(&once, "");
        assert_eq!(once, "abitazioni_civili");
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_labels_become_slugs() {
        assert_eq!(normalize_category("Loft / Open Space", ""), "loft_open_space");
        assert_eq!(normalize_category("  Baite & Rifugi  ", ""), "baite_rifugi");
    }

    #[test]
    fn empty_input_returns_fallback() {
        assert_eq!(normalize_category("", "negozi"), "negozi");
        assert_eq!(normalize_category("   ", ""), "");
    }

    #[test]
    fn descriptions_map_to_categories() {
        assert_eq!(category_for_description("Appartamento"), "abitazioni_civili");
        assert_eq!(category_for_description("posto auto scoperto"), "posti_auto_scoperti");
        assert_eq!(category_for_description("igloo"), "abitazioni_civili");
    }
}
