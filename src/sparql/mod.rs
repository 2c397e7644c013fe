//! SPARQL helpers shared by the report engine
//!
//! - Type-safe result extraction (`TypedValue` with fallible numeric views)
//! - Result tables that keep projection order
//! - Typed `$name` parameters and the read-only guard

pub mod parameters;
pub mod result_mapper;
pub mod typed_binding;

pub use parameters::{QueryParameter, bind_parameters, check_query_safety};
pub use result_mapper::{ResultTable, execute_select};
pub use typed_binding::{BindingError, TypedBinding, TypedValue};
