//! Learning sessions.
//!
//! A [`Session`][session] is everything the two phases of EM share: the model
//! whose weights are learned, the assignment of the random variables, the
//! training map, the reasoner holding the ground model, and the label
//! constraints. Phases receive it explicitly as `&mut Session`, so one session
//! can only run one phase at a time and independent sessions do not interact.
//!
//! [session]: struct.Session.html (Session struct)

use crate::common::*;
use crate::db::Database;

pub mod em;
pub mod reasoner;
pub mod training;

pub use self::reasoner::{
    GroundRule, GroundValueConstraint, Reasoner, ReasonerFactory, Reasoners,
};
pub use self::training::TrainingMap;

/// Grounds the rules of a model into a reasoner.
pub trait Grounder {
    /// Grounds every rule of the model against a view, registering the result
    /// in the reasoner.
    fn ground_all(
        &mut self,
        model: &Model,
        training: &TrainingMap,
        db: &dyn Database,
        reasoner: &mut dyn Reasoner,
    ) -> Res<()>;
}

/// Phase of an E-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No E-step is running, the reasoner holds no label constraint.
    Idle,
    /// Label constraints are being added to the reasoner.
    ConstraintsActive,
    /// The reasoner is optimizing.
    Optimizing,
    /// Label constraints have been removed.
    ConstraintsRemoved,
}
impl fmt::Display for Phase {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::ConstraintsActive => "constraints active",
            Phase::Optimizing => "optimizing",
            Phase::ConstraintsRemoved => "constraints removed",
        };
        fmt.write_str(s)
    }
}

/// State shared by the phases of a learning session.
pub struct Session {
    /// Configuration.
    conf: EmConf,
    /// Model whose weights are learned.
    model: Model,
    /// Values of the random variables.
    assignment: Assignment,
    /// Values of the atoms of the closed predicates of the random variable
    /// view.
    evidence: Assignment,
    /// Random variables paired with their observed value.
    training: TrainingMap,
    /// Holds the ground model.
    reasoner: Box<dyn Reasoner>,
    /// One constraint per label, the index of a label is its position.
    labels: Vec<GroundValueConstraint>,
    /// Current E-step phase.
    phase: Phase,
    /// Phases the last E-step went through.
    trace: Vec<Phase>,
    /// Profiler.
    profiler: Profiler,
}

impl Session {
    /// Initializes a session.
    ///
    /// - builds the training map from the random variable view and the
    ///   observed view,
    /// - seeds the assignment with the current values of the random variables,
    /// - remembers the values of the other atoms of the view as evidence,
    /// - creates the reasoner `conf.reasoner` names,
    /// - grounds the model in the reasoner against the random variable view,
    /// - creates one (inactive) constraint per label.
    ///
    /// Fails with [`ErrorKind::Configuration`][conf] if the reasoner cannot be
    /// created, and with [`ErrorKind::Grounding`][gnd] if grounding fails.
    ///
    /// [conf]: ../errors/enum.ErrorKind.html#variant.Configuration
    /// (ErrorKind's Configuration variant)
    /// [gnd]: ../errors/enum.ErrorKind.html#variant.Grounding
    /// (ErrorKind's Grounding variant)
    pub fn new(
        conf: EmConf,
        model: Model,
        rv: &dyn Database,
        observed: &dyn Database,
        reasoners: &Reasoners,
        grounder: &mut dyn Grounder,
    ) -> Res<Self> {
        let profiler = Profiler::new();
        profiler.tick(vec!["initialization"]);

        let training = TrainingMap::new(rv, observed);

        let rvs = rv.random_variables();
        let mut assignment = Assignment::with_capacity(rvs.len());
        for atom in &rvs {
            // Atoms of a view always have a value.
            let value = rv.value(atom).unwrap_or(0.0);
            assignment.set(atom, value)?;
        }

        let mut evidence = Assignment::new();
        for atom in rv.all_atoms() {
            if !rv.is_closed(atom.pred()) {
                continue;
            }
            if let Some(value) = rv.value(&atom) {
                evidence.set(&atom, value)?;
            }
        }

        let mut reasoner = reasoners.instantiate(&conf)?;

        profiler.tick(vec!["initialization", "grounding"]);
        grounder
            .ground_all(&model, &training, rv, &mut *reasoner)
            .chain_err(|| ErrorKind::Grounding(format!("while grounding {} rule(s)", model.len())))?;
        profiler.mark(vec!["initialization", "grounding"]);

        let mut labels = Vec::with_capacity(training.len());
        for (atom, value) in training.labels() {
            labels.push(GroundValueConstraint::new(atom.clone(), value)?)
        }

        log_info! {
            "session: {} rule(s), {} random variable(s), {} evidence atom(s), \
            {} label(s), reasoner `{}`",
            model.len(), assignment.len(), evidence.len(), labels.len(), conf.reasoner
        }

        profiler.mark(vec!["initialization"]);

        Ok(Session {
            conf,
            model,
            assignment,
            evidence,
            training,
            reasoner,
            labels,
            phase: Phase::Idle,
            trace: vec![],
            profiler,
        })
    }

    /// Configuration.
    pub fn conf(&self) -> &EmConf {
        &self.conf
    }

    /// Model.
    pub fn model(&self) -> &Model {
        &self.model
    }
    /// Model, mutable version for weight updates.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Assignment of the random variables.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }
    /// Assignment of the random variables, mutable version.
    pub fn assignment_mut(&mut self) -> &mut Assignment {
        &mut self.assignment
    }

    /// Values of the atoms of the closed predicates of the random variable
    /// view, as they were when the session was created.
    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }

    /// Training map.
    pub fn training(&self) -> &TrainingMap {
        &self.training
    }

    /// Reasoner.
    pub fn reasoner(&self) -> &dyn Reasoner {
        &*self.reasoner
    }
    /// Reasoner, mutable version.
    pub fn reasoner_mut(&mut self) -> &mut dyn Reasoner {
        &mut *self.reasoner
    }

    /// Label constraints, the index of a constraint is its position.
    pub fn labels(&self) -> &[GroundValueConstraint] {
        &self.labels
    }

    /// Iterator over the label constraints and their index.
    pub fn label_constraints(&self) -> impl Iterator<Item = (CstrIdx, &GroundValueConstraint)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, cstr)| (CstrIdx::new(idx), cstr))
    }

    /// Number of label constraints the reasoner currently holds.
    pub fn active_labels(&self) -> usize {
        (0..self.labels.len())
            .filter(|idx| self.reasoner.has_constraint(CstrIdx::new(*idx)))
            .count()
    }

    /// Current E-step phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }
    /// Phases the last E-step went through, in order.
    ///
    /// Empty if no E-step ran yet.
    pub fn phase_trace(&self) -> &[Phase] {
        &self.trace
    }
    /// Sets the phase.
    ///
    /// Entering [`Phase::ConstraintsActive`] starts a new trace.
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        log_debug! { "phase: {} -> {}", self.phase, phase }
        if phase == Phase::ConstraintsActive {
            self.trace.clear()
        }
        self.trace.push(phase);
        self.phase = phase
    }

    /// Runs the reasoner on the model and the assignment.
    pub fn optimize(&mut self) -> Res<()> {
        self.reasoner.optimize(&self.model, &mut self.assignment)
    }

    /// Profiler.
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Session")
            .field("conf", &self.conf)
            .field("model", &self.model)
            .field("assignment", &self.assignment)
            .field("evidence", &self.evidence)
            .field("training", &self.training)
            .field("labels", &self.labels)
            .field("phase", &self.phase)
            .finish()
    }
}
