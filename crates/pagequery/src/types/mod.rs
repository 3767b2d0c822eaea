//! Value types carried by a query description.
//!
//! [`Value`] is one bound parameter; [`FilterValue`] is the resolved shape of
//! one filter (range, list, scalar or absent).

mod filter;
mod value;

pub use filter::{FilterValue, Filters};
pub use value::Value;
