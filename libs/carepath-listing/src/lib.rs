#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! List-query engine.
//!
//! Turns untrusted pagination / search / filter / sort input plus a static
//! per-entity [`ListQuerySpec`] into a deterministic, bounded [`QueryPlan`],
//! and wraps fetched rows into a uniform [`PaginatedResult`] envelope.
//!
//! ## Usage
//!
//! ```
//! use carepath_listing::{ListQueryParams, ListQuerySpec, SortDirection, build_plan};
//!
//! let spec = ListQuerySpec::builder("patients")
//!     .searchable(["firstName", "lastName"])
//!     .sortable("lastName", "lastName")
//!     .default_sort("createdAt", SortDirection::Desc)
//!     .page_sizes(10, 100)
//!     .build()
//!     .expect("valid spec");
//!
//! let plan = build_plan(&spec, &ListQueryParams::new().page(2).search("smi"));
//! assert_eq!(plan.limit, 10);
//! assert_eq!(plan.offset, 10);
//! assert_eq!(plan.conditions.len(), 1);
//! ```
//!
//! Executing a plan against a store is the data-access layer's job; [`eval`]
//! provides an in-memory evaluator for tests and small fixed data sets.

pub mod condition;
pub mod error;
pub mod eval;
pub mod page;
pub mod params;
pub mod plan;
pub mod scope;
pub mod spec;

pub use condition::{Condition, FilterValue};
pub use error::SpecError;
pub use page::{PaginatedResult, Pagination, paginate};
pub use params::{ListQueryParams, PageRequest};
pub use plan::{OrderBy, QueryPlan, build_plan, build_scoped_plan};
pub use scope::scope_conditions;
pub use spec::{FieldDescriptor, FieldKind, ListQuerySpec, ListQuerySpecBuilder, SortDirection};
