//! In-memory database view.

use crate::common::*;
use crate::db::{Database, Substitutions};

/// In-memory database view.
///
/// Queries are conjunctions of positive atoms, evaluated by a nested-loop
/// join. An atom satisfies a query atom only if its truth value is not zero.
#[derive(Debug, Clone, Default)]
pub struct MemDb {
    /// Atoms and their values, by predicate.
    atoms: BTreeMap<Pred, BTreeMap<Atom, f64>>,
    /// Closed predicates.
    closed: HashSet<Pred>,
}

impl MemDb {
    /// Empty view.
    pub fn new() -> Self {
        MemDb::default()
    }

    /// Inserts an atom, returns its previous value if any.
    ///
    /// Fails if the arguments do not match the arity of the predicate or the
    /// value is not in `[0, 1]`.
    pub fn insert<Args, C>(&mut self, pred: &Pred, args: Args, value: f64) -> Res<Option<f64>>
    where
        Args: IntoIterator<Item = C>,
        C: Into<Cst>,
    {
        let atom = atom::new(pred, args)?;
        self.insert_atom(atom, value)
    }

    /// Inserts an atom, returns its previous value if any.
    ///
    /// Fails if the value is not in `[0, 1]`.
    pub fn insert_atom(&mut self, atom: Atom, value: f64) -> Res<Option<f64>> {
        let value = check_truth(value)?;
        Ok(self
            .atoms
            .entry(atom.pred().clone())
            .or_insert_with(BTreeMap::new)
            .insert(atom, value))
    }

    /// Marks a predicate as closed.
    pub fn close(&mut self, pred: &Pred) {
        let _ = self.closed.insert(pred.clone());
    }

    /// Number of atoms stored.
    pub fn len(&self) -> usize {
        self.atoms.values().map(BTreeMap::len).sum()
    }

    /// True if no atom is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extends the bindings with the atoms of `pred` matching `args`.
    fn join(
        &self,
        bindings: Vec<BTreeMap<Var, Cst>>,
        pred: &Pred,
        args: &[Term],
    ) -> Vec<BTreeMap<Var, Cst>> {
        let atoms = if let Some(atoms) = self.atoms.get(pred) {
            atoms
        } else {
            return vec![];
        };

        let mut res = vec![];
        for binding in bindings {
            'atoms: for (atom, value) in atoms {
                if *value == 0.0 {
                    continue 'atoms;
                }
                let mut binding = binding.clone();
                for (term, cst) in args.iter().zip(atom.args()) {
                    match term {
                        Term::Cst(expected) => {
                            if expected != cst {
                                continue 'atoms;
                            }
                        }
                        Term::Var(var) => {
                            if let Some(bound) = binding.get(var) {
                                if bound != cst {
                                    continue 'atoms;
                                }
                            } else {
                                let _ = binding.insert(var.clone(), cst.clone());
                            }
                        }
                    }
                }
                res.push(binding)
            }
        }
        res
    }
}

impl Database for MemDb {
    fn is_closed(&self, pred: &Pred) -> bool {
        self.closed.contains(pred)
    }

    fn value(&self, atom: &Atom) -> Option<f64> {
        self.atoms
            .get(atom.pred())
            .and_then(|atoms| atoms.get(atom))
            .cloned()
    }

    fn atoms(&self, pred: &Pred) -> Vec<Atom> {
        self.atoms
            .get(pred)
            .map(|atoms| atoms.keys().cloned().collect())
            .unwrap_or_else(Vec::new)
    }

    fn all_atoms(&self) -> Vec<Atom> {
        self.atoms
            .values()
            .flat_map(|atoms| atoms.keys().cloned())
            .collect()
    }

    fn query(&self, formula: &Formula) -> Res<Substitutions> {
        let conjuncts = if let Some(conjuncts) = formula.conjuncts() {
            conjuncts
        } else {
            bail!(ErrorKind::Query(format!(
                "`{}` is not a conjunction of positive atoms",
                formula
            )))
        };

        let mut bindings = vec![BTreeMap::new()];
        for (pred, args) in conjuncts {
            bindings = self.join(bindings, pred, args);
            if bindings.is_empty() {
                break;
            }
        }

        // Columns come out of the bindings sorted by variable name.
        let mut columns = formula.vars();
        columns.sort();
        let rows = bindings
            .into_iter()
            .map(|binding| binding.into_iter().map(|(_, cst)| cst).collect());
        Substitutions::of_columns(formula, &columns, rows)
    }
}
