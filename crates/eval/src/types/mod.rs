//! Runtime value types: the data type catalog, native values, and the
//! per-evaluation context.

pub mod context;
pub mod data_type;
pub mod datum;

pub use context::Context;
pub use data_type::DataType;
pub use datum::{Datum, Record};
