//! Weighted rules.

use crate::common::*;

/// A weighted rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Name of the rule, used in logs.
    name: String,
    /// Formula of the rule.
    formula: Formula,
    /// Weight, finite and non-negative.
    weight: f64,
    /// True if the distance to satisfaction of the rule is squared.
    squared: bool,
}
impl Rule {
    /// Name accessor.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Formula accessor.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }
    /// Weight accessor.
    pub fn weight(&self) -> f64 {
        self.weight
    }
    /// True if the distance to satisfaction of the rule is squared.
    pub fn squared(&self) -> bool {
        self.squared
    }
}
impl fmt::Display for Rule {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}: {} {}", self.name, self.weight, self.formula)?;
        if self.squared {
            write!(fmt, " ^2")?
        }
        Ok(())
    }
}

/// A collection of weighted rules.
///
/// Rules are never removed, their weights are the only thing that changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    rules: Vec<Rule>,
}
impl Model {
    /// Empty model.
    pub fn new() -> Self {
        Model::default()
    }

    /// Adds a rule, returns its index.
    ///
    /// Fails if the weight is negative or not finite.
    pub fn add_rule<S: Into<String>>(
        &mut self,
        name: S,
        formula: Formula,
        weight: f64,
        squared: bool,
    ) -> Res<RulIdx> {
        let name = name.into();
        let weight = check_weight(weight)?;
        let idx = RulIdx::new(self.rules.len());
        self.rules.push(Rule {
            name,
            formula,
            weight,
            squared,
        });
        Ok(idx)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule accessor.
    pub fn rule(&self, idx: RulIdx) -> &Rule {
        &self.rules[idx.get()]
    }

    /// Iterator over the rules and their index.
    pub fn rules(&self) -> impl Iterator<Item = (RulIdx, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (RulIdx::new(idx), rule))
    }

    /// Weight of a rule.
    pub fn weight(&self, idx: RulIdx) -> f64 {
        self.rule(idx).weight
    }

    /// Sets the weight of a rule, returns the previous weight.
    ///
    /// Fails if the weight is negative or not finite, in which case the model
    /// is unchanged.
    pub fn set_weight(&mut self, idx: RulIdx, weight: f64) -> Res<f64> {
        let weight = check_weight(weight)?;
        let rule = &mut self.rules[idx.get()];
        Ok(::std::mem::replace(&mut rule.weight, weight))
    }

    /// Snapshot of the weights, by rule index.
    pub fn weights(&self) -> Vec<f64> {
        self.rules.iter().map(|rule| rule.weight).collect()
    }
}
