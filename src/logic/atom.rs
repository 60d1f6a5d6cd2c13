//! Ground atoms and truth assignments.
//!
//! Atoms are reference-counted and compared structurally, so the atom a view
//! stores, the one the reasoner holds and the key of the assignment of a
//! session are the same atom as long as they have the same predicate and
//! arguments.

use crate::common::*;

/// Creates a ground atom.
///
/// Fails if the number of arguments is not the arity of the predicate.
pub fn new<Args, C>(pred: &Pred, args: Args) -> Res<Atom>
where
    Args: IntoIterator<Item = C>,
    C: Into<Cst>,
{
    let args: Vec<Cst> = args.into_iter().map(|arg| arg.into()).collect();
    pred.check_arity(args.len())?;
    Ok(Arc::new(RAtom {
        pred: pred.clone(),
        args,
    }))
}

/// Sorts some atoms by predicate, then arguments.
///
/// The order only depends on the atoms themselves, not on the order in which
/// they were created.
pub fn sort(atoms: &mut [Atom]) {
    atoms.sort()
}

/// A ground atom: a predicate applied to constants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RAtom {
    pred: Pred,
    args: Vec<Cst>,
}
impl RAtom {
    /// Predicate accessor.
    pub fn pred(&self) -> &Pred {
        &self.pred
    }
    /// Arguments accessor.
    pub fn args(&self) -> &[Cst] {
        &self.args
    }
}
impl fmt::Display for RAtom {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}(", self.pred.name())?;
        for (count, arg) in self.args.iter().enumerate() {
            if count > 0 {
                write!(fmt, ", ")?
            }
            write!(fmt, "{}", arg)?
        }
        write!(fmt, ")")
    }
}

/// Shared ground atom.
pub type Atom = Arc<RAtom>;

/// A set of ground atoms.
pub type AtomSet = HashSet<Atom>;

/// A map from ground atoms to something.
pub type AtomMap<T> = HashMap<Atom, T>;

/// Truth values of the random variable atoms of a session.
///
/// Written by the E-step, read by the M-step. Values are always in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Assignment {
    values: AtomMap<f64>,
}
impl Default for Assignment {
    fn default() -> Self {
        Assignment::new()
    }
}
impl Assignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Assignment {
            values: AtomMap::default(),
        }
    }

    /// Empty assignment with some capacity.
    pub fn with_capacity(capa: usize) -> Self {
        Assignment {
            values: AtomMap::with_capacity_and_hasher(capa, Default::default()),
        }
    }

    /// Value of an atom, if any.
    pub fn get(&self, atom: &Atom) -> Option<f64> {
        self.values.get(atom).cloned()
    }

    /// Sets the value of an atom, returns the previous value if any.
    ///
    /// Fails if the value is not in `[0, 1]`.
    pub fn set(&mut self, atom: &Atom, value: f64) -> Res<Option<f64>> {
        let value = check_truth(value)?;
        Ok(self.values.insert(atom.clone(), value))
    }

    /// True if the atom has a value.
    pub fn contains(&self, atom: &Atom) -> bool {
        self.values.contains_key(atom)
    }

    /// Number of atoms with a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no atom has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Atoms and their values, sorted by atom.
    pub fn sorted(&self) -> Vec<(Atom, f64)> {
        let mut res: Vec<_> = self
            .values
            .iter()
            .map(|(atom, value)| (atom.clone(), *value))
            .collect();
        res.sort_by(|(a_1, _), (a_2, _)| a_1.cmp(a_2));
        res
    }
}
