//! A small constraint-programming layer over a SAT engine.
//!
//! This is the one module in the crate that knows nothing about matches,
//! courts or participants: it exposes integer variables over order
//! encoding, linear (in)equalities that can be reified on a set of boolean
//! conditions, and a minimize/maximize objective solved by binary search.
//! [`crate::variables`], [`crate::constraints`] and [`crate::objective`]
//! are built on top of it the way the system this crate replaces builds
//! its scheduler on top of OR-Tools' CP-SAT.
//!
//! ## Example
//!
//! ```
//! use tourney_scheduler_core::cp::{CpModel, CpStatus, SolveOptions};
//!
//! let mut model = CpModel::new();
//! let x = model.new_int_var(0, 10, "x");
//! let y = model.new_int_var(0, 10, "y");
//!
//! model.add_linear_eq(&[x, y], &[1, 1], 10);
//! model.minimize(&[(x, 1)]);
//!
//! let solution = model.solve(&SolveOptions::default());
//! assert_eq!(solution.status, CpStatus::Optimal);
//! assert_eq!(solution.value(x), 0);
//! ```

mod model;

pub use model::*;
