//! Expectation-maximization with latent variables.
//!
//! Each round runs an E-step, which completes the assignment of the random
//! variables, and then an M-step, which updates the weights of the model from
//! that assignment. Both are strategies: [`LatentInference`][e] and
//! [`WeightUpdate`][m]. The default E-step is [`ConstrainedMap`][map].
//!
//! [e]: trait.LatentInference.html (LatentInference trait)
//! [m]: trait.WeightUpdate.html (WeightUpdate trait)
//! [map]: struct.ConstrainedMap.html (ConstrainedMap struct)

use crate::common::*;
use crate::learn::{GroundValueConstraint, Phase, Session};

/// E-step strategy.
pub trait LatentInference {
    /// Name of the strategy, used in logs.
    fn name(&self) -> &'static str;

    /// Completes the assignment of the session.
    ///
    /// Must leave the weights of the model untouched, and the reasoner without
    /// any label constraint whether it succeeds or fails.
    fn infer(&mut self, session: &mut Session) -> Res<()>;
}

/// M-step strategy.
pub trait WeightUpdate {
    /// Updates the weights of the model of the session, using its current
    /// assignment.
    fn perform_weight_update(&mut self, session: &mut Session) -> Res<()>;
}

/// Constrained MAP inference.
///
/// Pins every label to its observed value, lets the reasoner compute a most
/// probable assignment of everything else, and removes the pins. With
/// [`FreeAtoms::LatentOnly`][latent], the atoms of the reasoner that are
/// neither labels nor latent are also pinned, to their value in the random
/// variable view.
///
/// [latent]: ../../common/config/enum.FreeAtoms.html#variant.LatentOnly
/// (FreeAtoms' LatentOnly variant)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedMap;

impl ConstrainedMap {
    /// Constructor.
    pub fn new() -> Self {
        ConstrainedMap
    }
}

impl LatentInference for ConstrainedMap {
    fn name(&self) -> &'static str {
        "constrained map"
    }

    fn infer(&mut self, session: &mut Session) -> Res<()> {
        let free = session.conf().free;
        let mut pins = Pins::new(session);

        pins.pin_labels()?;
        if free == FreeAtoms::LatentOnly {
            pins.pin_observed()?
        }

        pins.session.set_phase(Phase::Optimizing);
        let res = pins.session.optimize();
        if let Err(e) = &res {
            log_warn! { "optimization failed: {}", e }
        }

        let unpinned = pins.release();
        match (res, unpinned) {
            (Err(e), Err(unpin_err)) => {
                log_warn! { "while unwinding E-step: {}", unpin_err }
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), unpinned) => unpinned,
        }
    }
}

/// Constraints pinned in the reasoner of a session.
///
/// Removes all of them when released or dropped, so that the reasoner holds no
/// pin after an E-step whether it succeeded, failed or panicked.
struct Pins<'a> {
    session: &'a mut Session,
    /// Pins in the reasoner.
    active: Vec<CstrIdx>,
}

impl<'a> Pins<'a> {
    /// Constructor, nothing is pinned yet.
    fn new(session: &'a mut Session) -> Self {
        Pins {
            session,
            active: vec![],
        }
    }

    /// Adds a constraint to the reasoner.
    fn pin(&mut self, idx: CstrIdx, cstr: &GroundValueConstraint) -> Res<()> {
        self.session.reasoner_mut().add_constraint(idx, cstr)?;
        self.active.push(idx);
        Ok(())
    }

    /// Pins the labels to their observed value.
    fn pin_labels(&mut self) -> Res<()> {
        self.session.set_phase(Phase::ConstraintsActive);
        let labels = self.session.labels().to_vec();
        for (idx, cstr) in labels.iter().enumerate() {
            self.pin(CstrIdx::new(idx), cstr)?
        }
        log_debug! { "pinned {} label(s)", labels.len() }
        Ok(())
    }

    /// Pins the atoms of the reasoner that are neither labels nor latent.
    ///
    /// The value of a pin is the value of the atom in the random variable
    /// view, or its current value if the view does not have it. Atoms with no
    /// value at all are left alone.
    fn pin_observed(&mut self) -> Res<()> {
        let mut idx = CstrIdx::new(self.session.labels().len());
        let mut atoms = self.session.reasoner().atoms();
        atom::sort(&mut atoms);
        atoms.dedup();

        let mut count = 0;
        for atom in atoms {
            let training = self.session.training();
            if training.is_label(&atom) || training.is_latent(&atom) {
                continue;
            }
            let value = self
                .session
                .evidence()
                .get(&atom)
                .or_else(|| self.session.assignment().get(&atom));
            let value = if let Some(value) = value {
                value
            } else {
                continue;
            };
            let cstr = GroundValueConstraint::new(atom, value)?;
            self.pin(idx, &cstr)?;
            idx.inc();
            count += 1
        }
        log_debug! { "pinned {} non-latent atom(s)", count }
        Ok(())
    }

    /// Removes every pin, keeps going on errors and returns the first one.
    fn unpin(&mut self) -> Res<()> {
        let mut res = Ok(());
        let count = self.active.len();
        for idx in self.active.drain(0..) {
            if let Err(e) = self.session.reasoner_mut().remove_constraint(idx) {
                log_warn! { "could not remove constraint {}: {}", idx.default_str(), e }
                if res.is_ok() {
                    res = Err(e)
                }
            }
        }
        log_debug! { "removed {} pin(s)", count }
        self.session.set_phase(Phase::ConstraintsRemoved);
        self.session.set_phase(Phase::Idle);
        res
    }

    /// Removes every pin.
    fn release(mut self) -> Res<()> {
        self.unpin()
    }
}

impl<'a> Drop for Pins<'a> {
    fn drop(&mut self) {
        if self.active.is_empty() && self.session.phase() == Phase::Idle {
            return;
        }
        if let Err(e) = self.unpin() {
            log_warn! { "while unwinding E-step: {}", e }
        }
    }
}

/// What a learning run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmStats {
    /// Rounds completed.
    pub rounds: usize,
    /// E-steps completed.
    pub e_steps: usize,
    /// M-steps completed.
    pub m_steps: usize,
}

/// Expectation-maximization learner.
///
/// The number of rounds is the `iterations` of the configuration of the
/// session it runs on. There is no early exit.
#[derive(Debug, Clone)]
pub struct Em<E, M> {
    /// E-step.
    e_step: E,
    /// M-step.
    m_step: M,
}

impl<M: WeightUpdate> Em<ConstrainedMap, M> {
    /// Learner using [`ConstrainedMap`](struct.ConstrainedMap.html) as its
    /// E-step.
    pub fn constrained(m_step: M) -> Self {
        Em::new(ConstrainedMap::new(), m_step)
    }
}

impl<E: LatentInference, M: WeightUpdate> Em<E, M> {
    /// Constructor.
    pub fn new(e_step: E, m_step: M) -> Self {
        Em { e_step, m_step }
    }

    /// E-step accessor.
    pub fn e_step(&self) -> &E {
        &self.e_step
    }

    /// M-step accessor.
    pub fn m_step(&self) -> &M {
        &self.m_step
    }

    /// Destroys the learner, yields its strategies.
    pub fn destroy(self) -> (E, M) {
        (self.e_step, self.m_step)
    }

    /// Runs the E-step on its own.
    ///
    /// Weights are not changed.
    pub fn infer_latent_variables(&mut self, session: &mut Session) -> Res<()> {
        let res = profile! {
            session wrap { self.e_step.infer(session) } "em", "e-step"
        };
        debug_assert_eq! { session.active_labels(), 0 }
        debug_assert_eq! { session.phase(), Phase::Idle }
        res
    }

    /// Runs all the rounds.
    ///
    /// A failing E-step aborts its round before the M-step, the error is
    /// propagated.
    pub fn run_learning(&mut self, session: &mut Session) -> Res<EmStats> {
        let iterations = session.conf().iterations;
        let mut stats = EmStats::default();
        log_info! {
            "running {} EM round(s), E-step: {}", iterations, self.e_step.name()
        }

        for round in 0..iterations {
            log_debug! { "beginning EM round {} of {}", round + 1, iterations }

            if let Err(e) = self.infer_latent_variables(session) {
                log_warn! { "EM round {} aborted during E-step", round + 1 }
                return Err(e);
            }
            stats.e_steps += 1;

            profile!(
                session wrap { self.m_step.perform_weight_update(session) } "em", "m-step"
            )?;
            stats.m_steps += 1;

            stats.rounds += 1;
            profile! { session "em rounds" => add 1 }
            log_debug! { "weights: {:?}", session.model().weights() }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::{Database, MemDb};
    use crate::learn::{
        GroundRule, Grounder, Reasoner, ReasonerFactory, Reasoners, TrainingMap,
    };

    /// What the reasoner does when optimizing.
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Outcome {
        /// Sets pinned atoms to their pin, the others to `value`.
        Solve(f64),
        Diverge,
        Infeasible,
    }

    /// Reasoner misbehaviors.
    #[derive(Debug, Clone, Copy, Default)]
    struct Faults {
        /// Rejects the constraint with this index.
        reject: Option<usize>,
        /// Drops constraints when asked to, but reports an error.
        sloppy_removal: bool,
    }

    struct TestReasoner {
        outcome: Outcome,
        faults: Faults,
        atoms: Vec<Atom>,
        live: BTreeMap<CstrIdx, GroundValueConstraint>,
    }
    impl Reasoner for TestReasoner {
        fn add_ground_rule(&mut self, rule: GroundRule) -> Res<()> {
            self.atoms.extend(rule.atoms);
            Ok(())
        }
        fn add_constraint(&mut self, idx: CstrIdx, cstr: &GroundValueConstraint) -> Res<()> {
            if self.faults.reject == Some(idx.get()) {
                bail!("constraint {} rejected", idx)
            }
            if self.live.insert(idx, cstr.clone()).is_some() {
                bail!("constraint {} added twice", idx)
            }
            Ok(())
        }
        fn remove_constraint(&mut self, idx: CstrIdx) -> Res<()> {
            if self.live.remove(&idx).is_none() {
                bail!("constraint {} is not live", idx)
            }
            if self.faults.sloppy_removal {
                bail!("lost track of constraint {}", idx)
            }
            Ok(())
        }
        fn has_constraint(&self, idx: CstrIdx) -> bool {
            self.live.contains_key(&idx)
        }
        fn constraint_count(&self) -> usize {
            self.live.len()
        }
        fn atoms(&self) -> Vec<Atom> {
            self.atoms.clone()
        }
        fn optimize(&mut self, _: &Model, assignment: &mut Assignment) -> Res<()> {
            let value = match self.outcome {
                Outcome::Solve(value) => value,
                Outcome::Diverge => bail!(ErrorKind::NumericDivergence),
                Outcome::Infeasible => bail!(ErrorKind::InfeasibleConstraintSet),
            };
            for atom in &self.atoms {
                let pinned = self.live.values().find(|cstr| cstr.atom() == atom);
                assignment.set(atom, pinned.map(|cstr| cstr.value()).unwrap_or(value))?;
            }
            Ok(())
        }
    }

    struct TestFactory(Outcome, Faults);
    impl ReasonerFactory for TestFactory {
        fn name(&self) -> &str {
            "test"
        }
        fn reasoner(&self, _: &EmConf) -> Res<Box<dyn Reasoner>> {
            Ok(Box::new(TestReasoner {
                outcome: self.0,
                faults: self.1,
                atoms: vec![],
                live: BTreeMap::new(),
            }))
        }
    }

    /// Grounds conjunctive rules by querying the view.
    struct QueryGrounder;
    impl Grounder for QueryGrounder {
        fn ground_all(
            &mut self,
            model: &Model,
            _: &TrainingMap,
            db: &dyn Database,
            reasoner: &mut dyn Reasoner,
        ) -> Res<()> {
            use crate::db::ResultList;
            for (idx, rule) in model.rules() {
                let res = db.query(rule.formula())?;
                for row in 0..res.size() {
                    let atoms = rule.formula().instantiate(res.get_row(row)?)?;
                    reasoner.add_ground_rule(GroundRule { rule: idx, atoms })?
                }
            }
            Ok(())
        }
    }

    /// Counts its calls, sets the weight of the first rule to the number of
    /// calls.
    #[derive(Default)]
    struct Counter(usize);
    impl WeightUpdate for Counter {
        fn perform_weight_update(&mut self, session: &mut Session) -> Res<()> {
            self.0 += 1;
            session
                .model_mut()
                .set_weight(RulIdx::new(0), self.0 as f64)?;
            Ok(())
        }
    }

    /// `knows(x, y) & friend(x, y)`: `knows` is evidence, `friend(a, b)` is a
    /// label, `friend(b, c)` is latent.
    fn session(outcome: Outcome, free: FreeAtoms) -> Session {
        session_with(outcome, free, Faults::default(), &[("a", "b")])
    }

    /// Same as `session`, the `friend` atoms of `labeled` are observed true.
    fn session_with(
        outcome: Outcome,
        free: FreeAtoms,
        faults: Faults,
        labeled: &[(&str, &str)],
    ) -> Session {
        let (knows, friend) = (Pred::new("knows", 2), Pred::new("friend", 2));
        let mut rv = MemDb::new();
        rv.insert(&knows, vec!["a", "b"], 1.0).unwrap();
        rv.insert(&knows, vec!["b", "c"], 0.8).unwrap();
        rv.close(&knows);
        rv.insert(&friend, vec!["a", "b"], 0.5).unwrap();
        rv.insert(&friend, vec!["b", "c"], 0.5).unwrap();
        let mut observed = MemDb::new();
        for &(x, y) in labeled {
            observed.insert(&friend, vec![x, y], 1.0).unwrap();
        }

        let mut model = Model::new();
        let formula = Formula::and(vec![
            Formula::atom(&knows, vec![Term::var("x"), Term::var("y")]).unwrap(),
            Formula::atom(&friend, vec![Term::var("x"), Term::var("y")]).unwrap(),
        ]);
        model.add_rule("knows friend", formula, 1.0, false).unwrap();

        let mut reasoners = Reasoners::new();
        reasoners.register(TestFactory(outcome, faults));
        let conf = EmConf::default().with_reasoner("test").with_free(free);

        Session::new(conf, model, &rv, &observed, &reasoners, &mut QueryGrounder).unwrap()
    }

    fn friend(x: &str, y: &str) -> Atom {
        atom::new(&Pred::new("friend", 2), vec![x, y]).unwrap()
    }
    fn knows(x: &str, y: &str) -> Atom {
        atom::new(&Pred::new("knows", 2), vec![x, y]).unwrap()
    }

    #[test]
    fn e_step_pins_labels() {
        let mut session = session(Outcome::Solve(0.25), FreeAtoms::Unlabeled);
        assert_eq!(session.labels().len(), session.training().len());
        assert_eq!(session.labels().len(), 1);
        assert_eq!(session.reasoner().atoms().len(), 4);

        let mut em = Em::constrained(Counter::default());
        em.infer_latent_variables(&mut session).unwrap();

        assert_eq!(session.reasoner().constraint_count(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(
            session.phase_trace(),
            &[
                Phase::ConstraintsActive,
                Phase::Optimizing,
                Phase::ConstraintsRemoved,
                Phase::Idle,
            ]
        );
        assert_eq!(session.assignment().get(&friend("a", "b")), Some(1.0));
        assert_eq!(session.assignment().get(&friend("b", "c")), Some(0.25));
        // Evidence is free with `Unlabeled`.
        assert_eq!(session.assignment().get(&knows("b", "c")), Some(0.25));
        // Weights untouched.
        assert_eq!(session.model().weights(), vec![1.0]);
        assert_eq!(em.m_step().0, 0)
    }

    #[test]
    fn latent_only_pins_evidence() {
        let mut session = session(Outcome::Solve(0.25), FreeAtoms::LatentOnly);
        assert_eq!(session.assignment().get(&knows("b", "c")), None);
        assert_eq!(session.evidence().get(&knows("b", "c")), Some(0.8));

        let mut em = Em::constrained(Counter::default());
        for _ in 0..2 {
            em.infer_latent_variables(&mut session).unwrap();
            assert_eq!(session.reasoner().constraint_count(), 0);
            assert_eq!(session.assignment().get(&friend("a", "b")), Some(1.0));
            assert_eq!(session.assignment().get(&friend("b", "c")), Some(0.25));
            assert_eq!(session.assignment().get(&knows("a", "b")), Some(1.0));
            assert_eq!(session.assignment().get(&knows("b", "c")), Some(0.8));
        }
    }

    #[test]
    fn rejected_pin_unwinds() {
        for free in &[FreeAtoms::Unlabeled, FreeAtoms::LatentOnly] {
            let faults = Faults {
                reject: Some(1),
                ..Faults::default()
            };
            let mut session = session_with(
                Outcome::Solve(0.25),
                *free,
                faults,
                &[("a", "b"), ("b", "c")],
            );
            assert_eq!(session.labels().len(), 2);

            let mut em = Em::constrained(Counter::default());
            let err = em.run_learning(&mut session).unwrap_err();
            assert!(err.to_string().contains("rejected"), "{}", err);
            assert!(!err.is_optimizer_failure());
            assert_eq!(session.reasoner().constraint_count(), 0);
            assert_eq!(session.active_labels(), 0);
            assert_eq!(session.phase(), Phase::Idle);
            assert_eq!(
                session.phase_trace(),
                &[
                    Phase::ConstraintsActive,
                    Phase::ConstraintsRemoved,
                    Phase::Idle,
                ]
            );
            // Never optimized, no M-step.
            assert_eq!(session.assignment().get(&friend("b", "c")), Some(0.5));
            assert_eq!(em.m_step().0, 0)
        }
    }

    #[test]
    fn optimizer_error_wins() {
        let faults = Faults {
            sloppy_removal: true,
            ..Faults::default()
        };
        let mut session = session_with(
            Outcome::Infeasible,
            FreeAtoms::LatentOnly,
            faults,
            &[("a", "b")],
        );
        let mut em = Em::constrained(Counter::default());
        let err = em.infer_latent_variables(&mut session).unwrap_err();
        assert!(err.is_infeasible(), "{}", err);
        assert_eq!(session.reasoner().constraint_count(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.phase_trace().last(), Some(&Phase::Idle));

        // Without an optimizer error, the removal error comes out.
        let mut session = session_with(
            Outcome::Solve(0.25),
            FreeAtoms::Unlabeled,
            faults,
            &[("a", "b")],
        );
        let err = em.infer_latent_variables(&mut session).unwrap_err();
        assert!(err.to_string().contains("lost track"), "{}", err);
        assert_eq!(session.reasoner().constraint_count(), 0);
        assert_eq!(session.phase(), Phase::Idle)
    }

    #[test]
    fn optimizer_failures_unwind() {
        for outcome in &[Outcome::Diverge, Outcome::Infeasible] {
            for free in &[FreeAtoms::Unlabeled, FreeAtoms::LatentOnly] {
                let mut session = session(*outcome, *free);
                let mut em = Em::constrained(Counter::default());
                let err = em.run_learning(&mut session).unwrap_err();
                assert!(err.is_optimizer_failure());
                assert_eq!(err.is_divergence(), *outcome == Outcome::Diverge);
                assert_eq!(session.reasoner().constraint_count(), 0);
                assert_eq!(session.active_labels(), 0);
                assert_eq!(session.phase(), Phase::Idle);
                assert_eq!(em.m_step().0, 0);
                assert_eq!(session.model().weights(), vec![1.0])
            }
        }
    }

    #[test]
    fn rounds() {
        let mut session = session(Outcome::Solve(0.5), FreeAtoms::Unlabeled);
        let mut em = Em::constrained(Counter::default());
        let stats = em.run_learning(&mut session).unwrap();
        assert_eq!(
            stats,
            EmStats {
                rounds: 10,
                e_steps: 10,
                m_steps: 10
            }
        );
        assert_eq!(session.model().weights(), vec![10.0]);
        assert_eq!(session.profiler().stat("em rounds"), 10);
        assert_eq!(session.reasoner().constraint_count(), 0)
    }
}
