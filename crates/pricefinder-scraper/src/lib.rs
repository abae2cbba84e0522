pub mod assemble;
pub mod client;
pub mod error;
mod html;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod quote;
mod rate_limit;
pub mod types;

pub use assemble::assemble;
pub use client::{CatalogClient, MAX_ALTERNATE_HOPS};
pub use error::{LookupError, ScraperError};
pub use http::HttpSettings;
pub use normalize::normalize_variants;
pub use pipeline::LookupPipeline;
pub use quote::QuoteClient;
