//! # Declarative
//!
//! A framework for reconciling declared state against remote resources.
//!
//! ## Core Concepts
//!
//! - **Schema**: per-kind attribute table with types, defaults and
//!   mutability; it alone decides update versus replace
//! - **ResourceDefinition**: a schema plus one function per lifecycle step,
//!   registered with a [`Provider`]
//! - **Driver**: runs create/read/update/delete for one instance, always
//!   reading back after a write, and turns failures into [`Diagnostic`]s
//! - **ExecutionPlan**: diffs ordered into a destroy phase (dependents
//!   first) and an apply phase (dependencies first)
//! - **Executor**: runs a plan, resolving declared values at execution time
//!   and skipping dependents of anything that failed
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     Address, AttrValue, Attribute, Driver, Provider, ResourceData,
//!     ResourceDefinition, Result, Schema, attributes,
//! };
//! use std::cell::Cell;
//!
//! struct Counter(Cell<u32>);
//!
//! fn create(c: &Counter, data: &mut ResourceData) -> Result<()> {
//!     c.0.set(c.0.get() + 1);
//!     data.set_id(format!("id-{}", c.0.get()));
//!     Ok(())
//! }
//!
//! fn read(_: &Counter, _: &mut ResourceData) -> Result<()> {
//!     Ok(())
//! }
//!
//! fn delete(_: &Counter, _: &ResourceData) -> Result<()> {
//!     Ok(())
//! }
//!
//! let provider = Provider::<Counter>::new("example", Schema::default()).with_resource(ResourceDefinition {
//!     kind: "thing",
//!     description: "A thing",
//!     schema: Schema::new(vec![
//!         Attribute::string("name").required().immutable(),
//!         Attribute::string("colour").default_value("blue"),
//!     ]),
//!     create,
//!     read,
//!     update: None,
//!     delete,
//! });
//!
//! let client = Counter(Cell::new(0));
//! let driver = Driver::new(&provider, &client);
//! let outcome = driver.create(
//!     &Address::new("thing", "first"),
//!     &attributes([("name", AttrValue::from("first"))]),
//!     vec![],
//! );
//!
//! let state = outcome.state.unwrap();
//! assert_eq!(state.id, "id-1");
//! assert_eq!(state.attributes["colour"], AttrValue::from("blue"));
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//! - [`DesiredState`]: Supplies resolved declarations to the executor
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks or configuration formats.

pub mod context;
pub mod diagnostic;
pub mod diff;
pub mod driver;
pub mod error;
pub mod executor;
pub mod planner;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diagnostic::{Diagnostic, Severity, has_errors};
pub use diff::{Action, AttributeChange, DiffSummary, ResourceDiff, diff_instance, group_by_kind};
pub use driver::{DataOutcome, Driver, Outcome};
pub use error::{Error, Result};
pub use executor::{
    DesiredState, ExecuteOptions, ExecuteReport, Resolution, StateMap, execute,
};
pub use planner::ExecutionPlan;
pub use provider::Provider;
pub use resource::{
    DataSourceDefinition, DeleteFn, LifecycleFn, ResourceData, ResourceDefinition,
};
pub use schema::{AttrType, Attribute, Mutability, Presence, Schema};
pub use types::{
    Address, ApplyResult, AttrValue, Attributes, ExecuteSummary, TrackedInstance, attributes,
};
