//! Predicates, constants, variables and terms.
//!
//! Ground atoms live in [`atom`], formulas with free variables in
//! [`formula`].
//!
//! [`atom`]: atom/index.html (atom module)
//! [`formula`]: formula/index.html (formula module)

use crate::common::*;

pub mod atom;
pub mod formula;


/// A predicate: a name and an arity.
///
/// Cheap to clone, the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pred {
    name: Arc<str>,
    arity: usize,
}
impl Pred {
    /// Constructor.
    pub fn new<S: AsRef<str>>(name: S, arity: usize) -> Self {
        Pred {
            name: name.as_ref().into(),
            arity,
        }
    }

    /// Name accessor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arity accessor.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Fails if `len` is not the arity of the predicate.
    pub fn check_arity(&self, len: usize) -> Res<()> {
        if len != self.arity {
            bail!(ErrorKind::Arity(self.arity, len))
        }
        Ok(())
    }
}
impl fmt::Display for Pred {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}/{}", self.name, self.arity)
    }
}

/// A constant, the arguments of ground atoms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cst {
    /// Unique identifier.
    Id(String),
    /// Integer attribute.
    Int(i64),
}
impl fmt::Display for Cst {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cst::Id(id) => write!(fmt, "\"{}\"", id),
            Cst::Int(int) => write!(fmt, "{}", int),
        }
    }
}
impl<'a> From<&'a str> for Cst {
    fn from(id: &'a str) -> Self {
        Cst::Id(id.into())
    }
}
impl From<String> for Cst {
    fn from(id: String) -> Self {
        Cst::Id(id)
    }
}
impl From<i64> for Cst {
    fn from(int: i64) -> Self {
        Cst::Int(int)
    }
}

/// A logical variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var {
    name: String,
}
impl Var {
    /// Constructor.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Var { name: name.into() }
    }

    /// Name accessor.
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Var {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&self.name)
    }
}
impl<'a> From<&'a str> for Var {
    fn from(name: &'a str) -> Self {
        Var::new(name)
    }
}

/// Arguments of atoms in formulas.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// Variable.
    Var(Var),
    /// Constant.
    Cst(Cst),
}
impl Term {
    /// Variable constructor.
    pub fn var<S: Into<String>>(name: S) -> Self {
        Term::Var(Var::new(name))
    }

    /// Constant constructor.
    pub fn cst<C: Into<Cst>>(cst: C) -> Self {
        Term::Cst(cst.into())
    }

    /// The variable, if any.
    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Term::Var(var) => Some(var),
            Term::Cst(_) => None,
        }
    }
}
impl fmt::Display for Term {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Var(var) => write!(fmt, "{}", var),
            Term::Cst(cst) => write!(fmt, "{}", cst),
        }
    }
}
impl From<Var> for Term {
    fn from(var: Var) -> Self {
        Term::Var(var)
    }
}
impl From<Cst> for Term {
    fn from(cst: Cst) -> Self {
        Term::Cst(cst)
    }
}
