//! Reasoners and value constraints.
//!
//! The numerical algorithm of a reasoner is not part of this crate: anything
//! implementing [`Reasoner`][reasoner] and registered in a
//! [`Reasoners`][reasoners] registry under the name a session is configured
//! with can be used.
//!
//! [reasoner]: trait.Reasoner.html (Reasoner trait)
//! [reasoners]: struct.Reasoners.html (Reasoners struct)

use crate::common::*;

/// Constrains a ground atom to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundValueConstraint {
    /// Atom constrained.
    atom: Atom,
    /// Value of the atom, in `[0, 1]`.
    value: f64,
}
impl GroundValueConstraint {
    /// Constructor.
    ///
    /// Fails if the value is not in `[0, 1]`.
    pub fn new(atom: Atom, value: f64) -> Res<Self> {
        let value = check_truth(value)?;
        Ok(GroundValueConstraint { atom, value })
    }

    /// Atom accessor.
    pub fn atom(&self) -> &Atom {
        &self.atom
    }

    /// Value accessor.
    pub fn value(&self) -> f64 {
        self.value
    }
}
impl fmt::Display for GroundValueConstraint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} = {}", self.atom, self.value)
    }
}

/// A rule instantiated on some ground atoms.
///
/// The atoms are the ones of the rule's formula, in the order of
/// [`Formula::atoms`][atoms].
///
/// [atoms]: ../../logic/formula/enum.Formula.html#method.atoms (atoms function)
#[derive(Debug, Clone, PartialEq)]
pub struct GroundRule {
    /// Rule this is an instance of.
    pub rule: RulIdx,
    /// Ground atoms.
    pub atoms: Vec<Atom>,
}

/// A continuous optimizer over a ground model.
///
/// The reasoner owns the ground rules of a session and a live set of value
/// constraints, identified by the index the session hands over. Weights are
/// read from the model at each optimization.
pub trait Reasoner: Send {
    /// Registers a ground rule.
    fn add_ground_rule(&mut self, rule: GroundRule) -> Res<()>;

    /// Adds a constraint to the live set.
    fn add_constraint(&mut self, idx: CstrIdx, cstr: &GroundValueConstraint) -> Res<()>;

    /// Removes a constraint from the live set.
    fn remove_constraint(&mut self, idx: CstrIdx) -> Res<()>;

    /// True if a constraint is in the live set.
    fn has_constraint(&self, idx: CstrIdx) -> bool;

    /// Number of constraints in the live set.
    fn constraint_count(&self) -> usize;

    /// Ground atoms mentioned by the ground rules.
    fn atoms(&self) -> Vec<Atom>;

    /// Computes a most probable assignment under the live constraints.
    ///
    /// Writes the values of the atoms it infers in `assignment`. Fails with
    /// [`ErrorKind::NumericDivergence`][div] or
    /// [`ErrorKind::InfeasibleConstraintSet`][inf].
    ///
    /// [div]: ../../errors/enum.ErrorKind.html#variant.NumericDivergence
    /// (ErrorKind's NumericDivergence variant)
    /// [inf]: ../../errors/enum.ErrorKind.html#variant.InfeasibleConstraintSet
    /// (ErrorKind's InfeasibleConstraintSet variant)
    fn optimize(&mut self, model: &Model, assignment: &mut Assignment) -> Res<()>;
}

/// Creates reasoners.
pub trait ReasonerFactory: Send + Sync {
    /// Name the factory is registered under.
    fn name(&self) -> &str;

    /// Creates a reasoner.
    fn reasoner(&self, conf: &EmConf) -> Res<Box<dyn Reasoner>>;
}

/// Registry of reasoner factories, by name.
#[derive(Default)]
pub struct Reasoners {
    factories: IndexMap<String, Box<dyn ReasonerFactory>>,
}
impl Reasoners {
    /// Empty registry.
    pub fn new() -> Self {
        Reasoners::default()
    }

    /// Registers a factory under its name, returns the factory it replaces if
    /// any.
    pub fn register<F>(&mut self, factory: F) -> Option<Box<dyn ReasonerFactory>>
    where
        F: ReasonerFactory + 'static,
    {
        let name = factory.name().to_string();
        self.factories.insert(name, Box::new(factory))
    }

    /// Factory registered under some name.
    pub fn get(&self, name: &str) -> Option<&dyn ReasonerFactory> {
        self.factories.get(name).map(|factory| &**factory)
    }

    /// Names of the factories, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|name| name.as_str())
    }

    /// Creates the reasoner a configuration asks for.
    ///
    /// Fails with [`ErrorKind::Configuration`][conf] if no factory has that
    /// name or the factory fails.
    ///
    /// [conf]: ../../errors/enum.ErrorKind.html#variant.Configuration
    /// (ErrorKind's Configuration variant)
    pub fn instantiate(&self, conf: &EmConf) -> Res<Box<dyn Reasoner>> {
        let factory = if let Some(factory) = self.get(&conf.reasoner) {
            factory
        } else {
            let known: Vec<_> = self.names().collect();
            bail!(ErrorKind::Configuration(format!(
                "unknown reasoner `{}`, expected one of [{}]",
                conf.reasoner,
                known.join(", ")
            )))
        };
        factory.reasoner(conf).chain_err(|| {
            ErrorKind::Configuration(format!("could not create reasoner `{}`", conf.reasoner))
        })
    }
}
impl fmt::Debug for Reasoners {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Nop;
    impl Reasoner for Nop {
        fn add_ground_rule(&mut self, _: GroundRule) -> Res<()> {
            Ok(())
        }
        fn add_constraint(&mut self, _: CstrIdx, _: &GroundValueConstraint) -> Res<()> {
            Ok(())
        }
        fn remove_constraint(&mut self, _: CstrIdx) -> Res<()> {
            Ok(())
        }
        fn has_constraint(&self, _: CstrIdx) -> bool {
            false
        }
        fn constraint_count(&self) -> usize {
            0
        }
        fn atoms(&self) -> Vec<Atom> {
            vec![]
        }
        fn optimize(&mut self, _: &Model, _: &mut Assignment) -> Res<()> {
            Ok(())
        }
    }

    struct NopFactory(&'static str, bool);
    impl ReasonerFactory for NopFactory {
        fn name(&self) -> &str {
            self.0
        }
        fn reasoner(&self, _: &EmConf) -> Res<Box<dyn Reasoner>> {
            if self.1 {
                Ok(Box::new(Nop))
            } else {
                bail!("out of licenses")
            }
        }
    }

    #[test]
    fn registry() {
        let mut reasoners = Reasoners::new();
        assert!(reasoners.register(NopFactory("nop", true)).is_none());
        assert!(reasoners.register(NopFactory("broken", false)).is_none());
        assert!(reasoners.register(NopFactory("nop", true)).is_some());
        assert_eq!(reasoners.names().collect::<Vec<_>>(), vec!["nop", "broken"]);

        let conf = EmConf::default().with_reasoner("nop");
        assert!(reasoners.instantiate(&conf).is_ok());

        for name in &["broken", "admm"] {
            let conf = EmConf::default().with_reasoner(*name);
            let err = reasoners.instantiate(&conf).err().unwrap();
            assert!(err.is_configuration(), "{}: {}", name, err)
        }
    }

    #[test]
    fn value_constraints() {
        let p = Pred::new("P", 1);
        let atom = atom::new(&p, vec!["a"]).unwrap();
        let cstr = GroundValueConstraint::new(atom.clone(), 0.3).unwrap();
        assert_eq!(cstr.atom(), &atom);
        assert_eq!(cstr.value(), 0.3);
        assert_eq!(cstr.to_string(), "P(\"a\") = 0.3");
        assert!(GroundValueConstraint::new(atom, 2.0)
            .unwrap_err()
            .is_value())
    }
}
