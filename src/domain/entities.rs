use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One price quotation for a zone/category pair.
///
/// Purchase figures are EUR per square metre, rental figures EUR per square
/// metre per month, both scaled by the reference area of the originating
/// query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    /// OMI micro-zone code (e.g. "B1", "C12").
    pub zone: String,
    /// Canonical category token (see `domain::categories`).
    pub category: String,
    /// Median conservation state reported for the zone, when present.
    pub condition: Option<String>,
    pub purchase_min: Option<f64>,
    pub purchase_median: Option<f64>,
    pub purchase_max: Option<f64>,
    pub rental_min: Option<f64>,
    pub rental_median: Option<f64>,
    pub rental_max: Option<f64>,
}

impl Quotation {
    /// At least one populated price field is the ground condition for a
    /// record to exist at all.
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

/// The assembled outcome of one upstream query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub territory_code: String,
    pub territory_name: String,
    pub reference_area: f64,
    pub zone_filter: Option<String>,
    /// Non-empty on success; an empty collection is surfaced as
    /// `OmiError::NoQuotations` instead of a result.
    pub quotations: Vec<Quotation>,
    /// Distinct zones that produced quotations, counted before filtering.
    pub zones_found: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

impl QueryResult {
    pub fn age(&self) -> time::Duration {
        OffsetDateTime::now_utc() - self.fetched_at
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().whole_seconds().max(0);
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Upstream operation filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Purchase,
    Rental,
}

impl Operation {
    /// Value of the upstream `operazione` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Operation::Purchase => "acquisto",
            Operation::Rental => "affitto",
        }
    }
}

/// A quotation query as the caller states it: human territory name plus
/// optional operation/zone/category filters.
#[derive(Clone, Debug, PartialEq)]
pub struct QuotationRequest {
    pub territory: String,
    /// Commercial square metres; 1.0 yields per-square-metre figures.
    pub reference_area: f64,
    pub operation: Option<Operation>,
    pub zone: Option<String>,
    pub category: Option<String>,
}

impl QuotationRequest {
    pub fn new(territory: impl Into<String>, reference_area: f64) -> Self {
        Self {
            territory: territory.into(),
            reference_area,
            operation: None,
            zone: None,
            category: None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Min/median/max triple for one operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFigures {
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl PriceFigures {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min.map(|value| value * factor),
            median: self.median.map(|value| value * factor),
            max: self.max.map(|value| value * factor),
        }
    }
}

/// Per-square-metre figures plus the totals for a requested area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub per_sqm: PriceFigures,
    pub total: PriceFigures,
}

impl PriceEstimate {
    pub fn from_quotation(quotation: &Quotation, operation: Operation, reference_area: f64) -> Self {
        let per_sqm = match operation {
            Operation::Purchase => PriceFigures {
                min: quotation.purchase_min,
                median: quotation.purchase_median,
                max: quotation.purchase_max,
            },
            Operation::Rental => PriceFigures {
                min: quotation.rental_min,
                median: quotation.rental_median,
                max: quotation.rental_max,
            },
        };
        Self {
            per_sqm,
            total: per_sqm.scaled(reference_area),
        }
    }
}
