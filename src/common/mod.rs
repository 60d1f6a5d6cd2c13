//! Base types and functions.

pub use std::collections::BTreeMap;
pub use std::fmt;
pub use std::sync::Arc;

pub use indexmap::{IndexMap, IndexSet};
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use crate::errors::*;
pub use crate::logic::{
    atom::{self, Assignment, Atom, AtomMap, AtomSet, RAtom},
    formula::Formula,
    Cst, Pred, Term, Var,
};
pub use crate::model::{Model, Rule};

mod wrappers;

#[macro_use]
pub mod macros;
pub mod config;
pub mod profiling;

pub use self::config::{EmConf, FreeAtoms};
pub use self::profiling::{Profiler, Stats};
pub use self::wrappers::*;

/// Checks that a truth value is in the unit interval.
pub fn check_truth(value: f64) -> Res<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        bail!(ErrorKind::Value(format!(
            "truth value {} is not in [0, 1]",
            value
        )))
    }
}

/// Checks that a rule weight is finite and non-negative.
pub fn check_weight(weight: f64) -> Res<f64> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        bail!(ErrorKind::Value(format!(
            "rule weight {} is not a finite non-negative number",
            weight
        )))
    }
}
