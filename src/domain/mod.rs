//! Domain logic for OMI quotations lives here.

pub mod categories;
pub mod collect;
pub mod entities;
pub mod gazetteer;
pub mod prices;

pub use categories::{category_for_description, is_canonical, normalize_category, CANONICAL_CATEGORIES};
pub use collect::{collect_quotations, CollectedQuotations, CATEGORY_KEYS, ZONE_KEYS};
pub use entities::{
    Operation, PriceEstimate, PriceFigures, QueryResult, Quotation, QuotationRequest,
};
pub use gazetteer::{title_case, zone_description, CadastralGazetteer, Gazetteer};
pub use prices::{extract_price_block, PriceBlock};
