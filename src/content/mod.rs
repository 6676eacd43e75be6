pub(crate) mod def;
pub(crate) mod document;
/// Builder helpers for content trees and documents.
pub mod dsl;
pub(crate) mod metrics;
pub(crate) mod model;
pub(crate) mod properties;
