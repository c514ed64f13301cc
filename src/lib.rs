//! Client library for Italian OMI real-estate price quotations.
//!
//! The quotation service returns JSON whose shape (field names, nesting
//! depth, wrapper envelopes) varies between endpoints and over time. This
//! crate turns those responses into a stable, strongly-typed set of
//! [`Quotation`] records: envelope unwrapping, a schema-tolerant recursive
//! collector, numeric and category normalization, a TTL response cache, and
//! a minimum-gap rate limiter, all orchestrated by [`OmiClient`].

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::entities::{
    Operation, PriceEstimate, PriceFigures, QueryResult, Quotation, QuotationRequest,
};
pub use domain::gazetteer::{CadastralGazetteer, Gazetteer};
pub use infra::omi::{OmiClient, OmiError};
