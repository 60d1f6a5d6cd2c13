//! Error types.
//!
//! Optimizer failures ([`ErrorKind::NumericDivergence`][div] and
//! [`ErrorKind::InfeasibleConstraintSet`][inf]) are local to an EM round: the
//! label constraints are unwound before they propagate. Everything else is
//! either a configuration/model problem or a misuse of a result list.
//!
//! [div]: enum.ErrorKind.html#variant.NumericDivergence
//! (NumericDivergence variant of the ErrorKind enum)
//! [inf]: enum.ErrorKind.html#variant.InfeasibleConstraintSet
//! (InfeasibleConstraintSet variant of the ErrorKind enum)

use crate::common::*;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Res;
    }

    foreign_links {
        Io(::std::io::Error) #[doc = "IO error."];
    }

    errors {
        #[doc = "Bad or missing configuration."]
        Configuration(msg: String) {
            description("configuration error")
            display("configuration error: {}", msg)
        }
        #[doc = "A rule could not be grounded."]
        Grounding(msg: String) {
            description("grounding error")
            display("grounding error: {}", msg)
        }
        #[doc = "The reasoner diverged while optimizing."]
        NumericDivergence {
            description("numeric divergence")
            display("reasoner diverged during optimization")
        }
        #[doc = "The reasoner's live constraint set has no solution."]
        InfeasibleConstraintSet {
            description("infeasible constraint set")
            display("reasoner reported an infeasible constraint set")
        }
        #[doc = "Row index out of range in a result list."]
        Index(row: usize, size: usize) {
            description("row index out of range")
            display("row index {} is out of range, result list has {} row(s)", row, size)
        }
        #[doc = "Variable is not free in the formula a result list originates from."]
        InvalidVariable(var: String) {
            description("invalid variable")
            display("variable `{}` does not appear free in the originating formula", var)
        }
        #[doc = "Wrong number of values."]
        Arity(expected: usize, found: usize) {
            description("arity mismatch")
            display("expected {} value(s), found {}", expected, found)
        }
        #[doc = "Illegal truth value or weight."]
        Value(msg: String) {
            description("illegal value")
            display("illegal value: {}", msg)
        }
        #[doc = "Query the database cannot evaluate."]
        Query(msg: String) {
            description("unsupported query")
            display("unsupported query: {}", msg)
        }
    }
}

impl Error {
    /// True if the kind of the error is [`ErrorKind::NumericDivergence`][div].
    ///
    /// [div]: enum.ErrorKind.html#variant.NumericDivergence
    /// (ErrorKind's NumericDivergence variant)
    pub fn is_divergence(&self) -> bool {
        matches!(*self.kind(), ErrorKind::NumericDivergence)
    }

    /// True if the kind of the error is
    /// [`ErrorKind::InfeasibleConstraintSet`][inf].
    ///
    /// [inf]: enum.ErrorKind.html#variant.InfeasibleConstraintSet
    /// (ErrorKind's InfeasibleConstraintSet variant)
    pub fn is_infeasible(&self) -> bool {
        matches!(*self.kind(), ErrorKind::InfeasibleConstraintSet)
    }

    /// True if the error comes from the reasoner's optimization.
    pub fn is_optimizer_failure(&self) -> bool {
        self.is_divergence() || self.is_infeasible()
    }

    /// True if the kind of the error is [`ErrorKind::Index`][index].
    ///
    /// [index]: enum.ErrorKind.html#variant.Index
    /// (ErrorKind's Index variant)
    pub fn is_index(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Index(_, _))
    }

    /// True if the kind of the error is [`ErrorKind::InvalidVariable`][var].
    ///
    /// [var]: enum.ErrorKind.html#variant.InvalidVariable
    /// (ErrorKind's InvalidVariable variant)
    pub fn is_invalid_variable(&self) -> bool {
        matches!(*self.kind(), ErrorKind::InvalidVariable(_))
    }

    /// True if the kind of the error is [`ErrorKind::Configuration`][conf].
    ///
    /// [conf]: enum.ErrorKind.html#variant.Configuration
    /// (ErrorKind's Configuration variant)
    pub fn is_configuration(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Configuration(_))
    }

    /// True if the kind of the error is [`ErrorKind::Grounding`][gnd].
    ///
    /// [gnd]: enum.ErrorKind.html#variant.Grounding
    /// (ErrorKind's Grounding variant)
    pub fn is_grounding(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Grounding(_))
    }

    /// True if the kind of the error is [`ErrorKind::Arity`][arity].
    ///
    /// [arity]: enum.ErrorKind.html#variant.Arity
    /// (ErrorKind's Arity variant)
    pub fn is_arity(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Arity(_, _))
    }

    /// True if the kind of the error is [`ErrorKind::Value`][val].
    ///
    /// [val]: enum.ErrorKind.html#variant.Value
    /// (ErrorKind's Value variant)
    pub fn is_value(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Value(_))
    }
}
