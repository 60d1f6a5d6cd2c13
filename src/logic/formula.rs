//! Formulas with free variables.
//!
//! The order of the free variables of a formula is the order of their first
//! occurrence in a depth-first, left-to-right traversal. This order is the
//! column order of every [`ResultList`][results] produced for the formula,
//! and [`Formula::instantiate`][inst] relies on it to build ground atoms.
//!
//! [results]: ../../db/results/trait.ResultList.html (ResultList trait)
//! [inst]: enum.Formula.html#method.instantiate (instantiate function)

use crate::common::*;

/// A formula over predicates, variables and constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Predicate application.
    Atom(Pred, Vec<Term>),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction.
    And(Vec<Formula>),
    /// Disjunction.
    Or(Vec<Formula>),
}

impl Formula {
    /// Predicate application.
    ///
    /// Fails if the number of arguments is not the arity of the predicate.
    pub fn atom<Args, T>(pred: &Pred, args: Args) -> Res<Self>
    where
        Args: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let args: Vec<Term> = args.into_iter().map(|arg| arg.into()).collect();
        pred.check_arity(args.len())?;
        Ok(Formula::Atom(pred.clone(), args))
    }

    /// Negation.
    pub fn not(self) -> Self {
        Formula::Not(Box::new(self))
    }

    /// Conjunction.
    pub fn and(kids: Vec<Formula>) -> Self {
        Formula::And(kids)
    }

    /// Disjunction.
    pub fn or(kids: Vec<Formula>) -> Self {
        Formula::Or(kids)
    }

    /// Calls `f` on the atom patterns of the formula, depth-first and
    /// left-to-right.
    fn iter_atoms<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Pred, &'a [Term]),
    {
        match self {
            Formula::Atom(pred, args) => f(pred, args.as_slice()),
            Formula::Not(kid) => kid.iter_atoms(f),
            Formula::And(kids) | Formula::Or(kids) => {
                for kid in kids {
                    kid.iter_atoms(f)
                }
            }
        }
    }

    /// Atom patterns of the formula, in traversal order.
    pub fn atoms(&self) -> Vec<(&Pred, &[Term])> {
        let mut res = vec![];
        self.iter_atoms(&mut |pred, args| res.push((pred, args)));
        res
    }

    /// Distinct free variables in order of first occurrence.
    ///
    /// ```
    /// # use latent::logic::{Pred, Term, formula::Formula};
    /// let (p, q) = (Pred::new("P", 2), Pred::new("Q", 2));
    /// let formula = Formula::and(vec![
    ///     Formula::atom(&p, vec![Term::var("x"), Term::var("y")]).unwrap(),
    ///     Formula::atom(&q, vec![Term::var("y"), Term::var("z")]).unwrap(),
    /// ]);
    /// let vars: Vec<_> = formula.vars().iter().map(|v| v.name().to_string()).collect();
    /// assert_eq!(vars, vec!["x", "y", "z"]);
    /// ```
    pub fn vars(&self) -> Vec<Var> {
        let mut vars = IndexSet::new();
        self.iter_atoms(&mut |_, args| {
            for var in args.iter().filter_map(Term::as_var) {
                if !vars.contains(var) {
                    vars.insert(var.clone());
                }
            }
        });
        vars.into_iter().collect()
    }

    /// The atom patterns of the formula if it is a conjunction of positive
    /// atoms, `None` otherwise.
    ///
    /// A single atom is a conjunction, and so are nested conjunctions.
    pub fn conjuncts(&self) -> Option<Vec<(&Pred, &[Term])>> {
        match self {
            Formula::Atom(pred, args) => Some(vec![(pred, args.as_slice())]),
            Formula::And(kids) => {
                let mut res = vec![];
                for kid in kids {
                    res.extend(kid.conjuncts()?)
                }
                Some(res)
            }
            Formula::Not(_) | Formula::Or(_) => None,
        }
    }

    /// Ground atoms of the formula for a row of values.
    ///
    /// The `i`-th value of `row` is the value of the `i`-th variable of
    /// [`vars`](#method.vars). Fails if the row does not have one value per
    /// variable.
    pub fn instantiate(&self, row: &[Cst]) -> Res<Vec<Atom>> {
        let vars = self.vars();
        if vars.len() != row.len() {
            bail!(ErrorKind::Arity(vars.len(), row.len()))
        }
        let binding: HashMap<&Var, &Cst> = vars.iter().zip(row.iter()).collect();

        let mut res = vec![];
        for (pred, args) in self.atoms() {
            let mut csts = Vec::with_capacity(args.len());
            for arg in args {
                let cst = match arg {
                    Term::Cst(cst) => cst.clone(),
                    // Every variable is bound, `vars` collects all of them.
                    Term::Var(var) => binding[var].clone(),
                };
                csts.push(cst)
            }
            res.push(atom::new(pred, csts)?)
        }
        Ok(res)
    }

    /// Writes a sub-formula, parenthesized if it is not an atom or a negation.
    fn fmt_kid(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Atom(_, _) | Formula::Not(_) => write!(fmt, "{}", self),
            Formula::And(_) | Formula::Or(_) => write!(fmt, "({})", self),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Atom(pred, args) => {
                write!(fmt, "{}(", pred.name())?;
                for (count, arg) in args.iter().enumerate() {
                    if count > 0 {
                        write!(fmt, ", ")?
                    }
                    write!(fmt, "{}", arg)?
                }
                write!(fmt, ")")
            }
            Formula::Not(kid) => {
                write!(fmt, "!")?;
                kid.fmt_kid(fmt)
            }
            Formula::And(kids) | Formula::Or(kids) => {
                if kids.is_empty() {
                    let empty = if let Formula::And(_) = self {
                        "true"
                    } else {
                        "false"
                    };
                    return fmt.write_str(empty);
                }
                let sep = if let Formula::And(_) = self {
                    " & "
                } else {
                    " | "
                };
                for (count, kid) in kids.iter().enumerate() {
                    if count > 0 {
                        fmt.write_str(sep)?
                    }
                    kid.fmt_kid(fmt)?
                }
                Ok(())
            }
        }
    }
}
