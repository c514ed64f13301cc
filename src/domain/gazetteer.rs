//! Territory lookup: Italian comune names to cadastral codes.
//!
//! The upstream service keys every query on the cadastral code published by
//! the Agenzia delle Entrate, never on the comune name itself.

/// Resolves a human territory name to the upstream identifier.
///
/// A `None` result means the caller supplied an unknown territory; that is an
/// input fault, not an upstream failure.
pub trait Gazetteer: Send + Sync {
    fn territory_code(&self, name: &str) -> Option<String>;
}

/// Gazetteer backed by the static cadastral-code table of the provincial
/// capitals (plus a few other relevant comuni).
#[derive(Clone, Copy, Debug, Default)]
pub struct CadastralGazetteer;

impl CadastralGazetteer {
    /// Reverse lookup: comune name (title-cased) for a cadastral code.
    pub fn city_for_code(&self, code: &str) -> Option<String> {
        let wanted = code.trim().to_uppercase();
        CADASTRAL_CODES
            .iter()
            .find(|(_, candidate)| *candidate == wanted)
            .map(|(city, _)| title_case(city))
    }

    /// Every comune in the bundled table, in table order.
    pub fn cities(&self) -> impl Iterator<Item = &'static str> {
        CADASTRAL_CODES.iter().map(|(city, _)| *city)
    }
}

impl Gazetteer for CadastralGazetteer {
    fn territory_code(&self, name: &str) -> Option<String> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        CADASTRAL_CODES
            .iter()
            .find(|(city, _)| *city == wanted)
            .map(|(_, code)| (*code).to_string())
    }
}

/// Title-cases a comune name for display ("reggio emilia" -> "Reggio Emilia").
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human description of an OMI zone code by its band letter.
pub fn zone_description(zone: &str) -> &'static str {
    match zone.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('B') => "Centro - zona centrale con servizi e negozi",
        Some('C') => "Semicentro - zona residenziale ben servita",
        Some('D') => "Periferia - zona periferica con buoni collegamenti",
        Some('E') => "Estrema periferia - zona esterna al centro urbano",
        Some(_) => "Zona urbana",
        None => "Zona non specificata",
    }
}

// Source: Agenzia delle Entrate.
const CADASTRAL_CODES: [(&str, &str); 108] = [
    // Lombardia
    ("milano", "F205"),
    ("bergamo", "A794"),
    ("brescia", "B157"),
    ("como", "C933"),
    ("cremona", "D150"),
    ("lecco", "E507"),
    ("lodi", "E648"),
    ("mantova", "E897"),
    ("monza", "F704"),
    ("pavia", "G388"),
    ("sondrio", "I822"),
    ("varese", "L682"),
    // Lazio
    ("roma", "H501"),
    ("frosinone", "D810"),
    ("latina", "E472"),
    ("rieti", "H282"),
    ("viterbo", "M082"),
    // Campania
    ("napoli", "F839"),
    ("avellino", "A509"),
    ("benevento", "A783"),
    ("caserta", "B963"),
    ("salerno", "H703"),
    // Piemonte
    ("torino", "L219"),
    ("alessandria", "A182"),
    ("asti", "A479"),
    ("biella", "A859"),
    ("cuneo", "D205"),
    ("novara", "F952"),
    ("verbania", "L746"),
    ("vercelli", "L750"),
    // Veneto
    ("venezia", "L736"),
    ("belluno", "A757"),
    ("padova", "G224"),
    ("rovigo", "H620"),
    ("treviso", "L407"),
    ("verona", "L781"),
    ("vicenza", "L840"),
    // Emilia-Romagna
    ("bologna", "A944"),
    ("ferrara", "D548"),
    ("forli", "D704"),
    ("modena", "F257"),
    ("parma", "G337"),
    ("piacenza", "G535"),
    ("ravenna", "H199"),
    ("reggio emilia", "H223"),
    ("rimini", "H294"),
    // Toscana
    ("firenze", "D612"),
    ("arezzo", "A390"),
    ("grosseto", "E202"),
    ("livorno", "E625"),
    ("lucca", "E715"),
    ("massa", "F023"),
    ("pisa", "G702"),
    ("pistoia", "G713"),
    ("prato", "G999"),
    ("siena", "I726"),
    // Puglia
    ("bari", "A662"),
    ("brindisi", "B180"),
    ("foggia", "D643"),
    ("lecce", "E506"),
    ("taranto", "L049"),
    ("barletta", "A669"),
    // Sicilia
    ("palermo", "G273"),
    ("agrigento", "A089"),
    ("caltanissetta", "B429"),
    ("catania", "C351"),
    ("enna", "C342"),
    ("messina", "F158"),
    ("ragusa", "H163"),
    ("siracusa", "I754"),
    ("trapani", "L331"),
    // Liguria
    ("genova", "D969"),
    ("imperia", "E290"),
    ("la spezia", "E463"),
    ("savona", "I480"),
    // Trentino-Alto Adige
    ("trento", "L378"),
    ("bolzano", "A952"),
    // Friuli-Venezia Giulia
    ("trieste", "L424"),
    ("gorizia", "E098"),
    ("pordenone", "G888"),
    ("udine", "L483"),
    // Marche
    ("ancona", "A271"),
    ("ascoli piceno", "A462"),
    ("fermo", "D542"),
    ("macerata", "E783"),
    ("pesaro", "G540"),
    ("urbino", "L500"),
    // Umbria
    ("perugia", "G478"),
    ("terni", "L117"),
    // Calabria
    ("catanzaro", "C352"),
    ("cosenza", "D086"),
    ("crotone", "D122"),
    ("reggio calabria", "H224"),
    ("vibo valentia", "F537"),
    // Sardegna
    ("cagliari", "B354"),
    ("nuoro", "F979"),
    ("oristano", "G113"),
    ("sassari", "I452"),
    ("olbia", "G015"),
    // Abruzzo
    ("laquila", "A345"),
    ("chieti", "C632"),
    ("pescara", "G482"),
    ("teramo", "L103"),
    // Molise
    ("campobasso", "B519"),
    ("isernia", "E335"),
    // Basilicata
    ("potenza", "G942"),
    ("matera", "F052"),
    // Valle d'Aosta
    ("aosta", "A326"),
];
