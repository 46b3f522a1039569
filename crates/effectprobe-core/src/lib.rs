//! effectprobe-core: Core library for effectprobe
//!
//! Property-based testing of parameterized pipelines. Users declare, per
//! parameter, how a scalar metric should respond when the parameter value
//! increases. The library plans a small set of tests that covers every
//! pairwise interaction of candidate values, then checks the measured
//! outcomes against the declared monotonic relationships.
//!
//! # Architecture
//!
//! ```text
//! ParameterGroup → TestableParameter tree → domains → covering array → Tests
//!                                                                        ↓
//!            Violations ← analyzer ← TestOutcomes ← ExecutionDriver ←────┘
//! ```
//!
//! # Modules
//!
//! - `effect`: The effect algebra (combine, reverse, directional effects)
//! - `value`, `parameter`: Live parameter model and the `ParameterStore` seam
//! - `testable`: Testable-parameter tree (leaves and composites)
//! - `assignment`: Assignments and tests
//! - `domain`: Candidate value generation
//! - `covering`: Plain and constraint-aware covering-array builders
//! - `plan`: Test plans over the selected leaves of a tree
//! - `driver`: Execution contract
//! - `outcome`: Measured results
//! - `analyzer`: Violation detection
//! - `report`: Plain-text violation reports
//! - `config`: Configuration management
//! - `logging`: Structured logging
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod analyzer;
pub mod assignment;
pub mod config;
pub mod covering;
pub mod domain;
pub mod driver;
pub mod effect;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod parameter;
pub mod plan;
pub mod report;
pub mod testable;
pub mod value;

pub use analyzer::{Violation, analyze, check_outcomes};
pub use assignment::{Assignment, Test};
pub use config::Config;
pub use covering::{
    ConstrainedDomain, CoveringConfig, constrained_covering_array, covering_array,
};
pub use domain::{AssignmentGenerator, DomainConfig, GridGenerator};
pub use driver::{ExecutionDriver, StoreDriver, run_plan};
pub use effect::{Effect, combine, comparator, directional_effect, reverse};
pub use error::{DriverError, Error, Result};
pub use outcome::{Measurement, TestOutcome};
pub use parameter::{ParamId, Parameter, ParameterGroup, ParameterNode, ParameterStore};
pub use plan::{PlanOptions, PlanStrategy, TestPlan, build_plan};
pub use testable::TestableParameter;
pub use value::{Bounds, ParamValue, ValueKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
