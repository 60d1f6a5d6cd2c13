//! Database views.
//!
//! A learning session reads two views: the *random variable* view, whose open
//! predicates hold the atoms a reasoner infers, and the *observed* view
//! holding ground truth. Storage and query evaluation are not this crate's
//! business, [`MemDb`][mem] is a small in-memory view for embedders and
//! tests.
//!
//! [mem]: mem/struct.MemDb.html (MemDb struct)

use crate::common::*;

pub mod mem;
pub mod results;

pub use self::mem::MemDb;
pub use self::results::{ResultList, Substitutions};

/// A view over ground atoms and their truth values.
pub trait Database {
    /// True if the predicate is fully observed in this view.
    fn is_closed(&self, pred: &Pred) -> bool;

    /// Truth value of an atom, if stored.
    fn value(&self, atom: &Atom) -> Option<f64>;

    /// Atoms stored for a predicate.
    fn atoms(&self, pred: &Pred) -> Vec<Atom>;

    /// All the atoms stored, sorted.
    fn all_atoms(&self) -> Vec<Atom>;

    /// Atoms of the open predicates, sorted.
    fn random_variables(&self) -> Vec<Atom> {
        self.all_atoms()
            .into_iter()
            .filter(|atom| !self.is_closed(atom.pred()))
            .collect()
    }

    /// Evaluates a formula.
    ///
    /// Rows of the result are in the order of [`Formula::vars`][vars].
    ///
    /// [vars]: ../logic/formula/enum.Formula.html#method.vars (vars function)
    fn query(&self, formula: &Formula) -> Res<Substitutions>;
}
