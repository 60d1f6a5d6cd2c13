//! Latent is an expectation-maximization weight learner for soft-logic models
//! with latent variables.
//!
//! Learning alternates between
//!
//! - an *E-step*, which pins the labeled random variables to their observed
//!   values and lets a reasoner infer the most probable values of everything
//!   else, and
//! - an *M-step*, which updates the rule weights using the completed
//!   assignment.
//!
//! The reasoner, the grounding of rules and the weight update are
//! collaborators behind traits (see [`learn`]). The crate also defines the
//! [`ResultList`][results] contract for the substitutions a query produces,
//! which grounding code relies on to build ground atoms.
//!
//! [results]: db/results/trait.ResultList.html (ResultList trait)

#![doc(test(attr(deny(warnings))))]
#![allow(non_upper_case_globals)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate clap;
extern crate indexmap;
extern crate rustc_hash;

pub mod errors;
#[macro_use]
pub mod common;
pub mod db;
pub mod learn;
pub mod logic;
pub mod model;

pub use crate::common::config::{EmConf, FreeAtoms};
pub use crate::learn::{
    em::{ConstrainedMap, Em, EmStats, LatentInference, WeightUpdate},
    Phase, Session,
};
