//! Training map: pairs random variable atoms with their observed values.

use crate::common::*;
use crate::db::Database;

/// Pairs the random variable atoms of a session with their ground truth.
///
/// Built once per session, read-only afterwards. All collections are sorted by
/// atom so that everything derived from the map, the label constraints in
/// particular, does not depend on the iteration order of the views.
#[derive(Debug, Clone, Default)]
pub struct TrainingMap {
    /// Random variables with an observed value, and that value.
    labels: IndexMap<Atom, f64>,
    /// Random variables with no observed value.
    latent: Vec<Atom>,
    /// Observed atoms that are not random variables.
    unpaired: Vec<Atom>,
}

impl TrainingMap {
    /// Builds the map from a random variable view and an observed view.
    pub fn new(rv: &dyn Database, observed: &dyn Database) -> Self {
        let mut rvs = rv.random_variables();
        atom::sort(&mut rvs);

        let mut labels = IndexMap::with_capacity(rvs.len());
        let mut latent = vec![];
        for atom in rvs {
            if let Some(value) = observed.value(&atom) {
                let _ = labels.insert(atom, value);
            } else {
                latent.push(atom)
            }
        }

        let mut unpaired: Vec<_> = observed
            .all_atoms()
            .into_iter()
            .filter(|atom| !labels.contains_key(atom))
            .collect();
        atom::sort(&mut unpaired);

        if !unpaired.is_empty() {
            log_debug! {
                "{} observed atom(s) are not random variables and are ignored", unpaired.len()
            }
        }
        log_debug! {
            "training map: {} label(s), {} latent atom(s)", labels.len(), latent.len()
        }

        TrainingMap {
            labels,
            latent,
            unpaired,
        }
    }

    /// Labels and their observed value, sorted by atom.
    pub fn labels(&self) -> impl Iterator<Item = (&Atom, f64)> {
        self.labels.iter().map(|(atom, value)| (atom, *value))
    }

    /// Observed value of a label.
    pub fn label(&self, atom: &Atom) -> Option<f64> {
        self.labels.get(atom).cloned()
    }

    /// True if the atom is a label.
    pub fn is_label(&self, atom: &Atom) -> bool {
        self.labels.contains_key(atom)
    }

    /// Random variables with no observed value, sorted.
    pub fn latent(&self) -> &[Atom] {
        &self.latent
    }

    /// True if the atom is a random variable with no observed value.
    pub fn is_latent(&self, atom: &Atom) -> bool {
        self.latent.binary_search(atom).is_ok()
    }

    /// Observed atoms that are not random variables, sorted.
    pub fn unpaired(&self) -> &[Atom] {
        &self.unpaired
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
