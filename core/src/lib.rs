//! Building blocks for querying the Ads reporting API on behalf of an agent:
//! the resource catalog, query assembly, and normalization of response rows
//! into plain JSON.

pub mod catalog;
pub mod error;
pub mod normalize;
pub mod projector;
pub mod query;
pub mod search;
pub mod wire;

pub use catalog::{ResourceSchema, SchemaCatalog};
pub use error::{RequestError, ResourceLookupError, TransportError};
pub use projector::NormalizedRow;
pub use query::{Limit, SearchRequest};
pub use search::{FieldMask, SearchBatch, SearchTransport, execute_search};
pub use wire::WireValue;
