//! Configuration.
//!
//! The EM options are a clap argument group any embedding application can add
//! to its own command line with [`EmConf::add_args`][add], and read back with
//! [`EmConf::new`][new]. All options are namespaced with the `em_` prefix.
//!
//! [add]: struct.EmConf.html#method.add_args (EmConf's add_args function)
//! [new]: struct.EmConf.html#method.new (EmConf's new function)

use std::fmt;

use clap::Arg;

use crate::errors::*;

/// Clap `Command` with static lifetime.
pub type App = ::clap::Command<'static>;
/// Clap `ArgMatches`.
pub type Matches = ::clap::ArgMatches;

/// Prefix of the EM options.
pub const em_prefix: &str = "em";
/// Key of the number of EM rounds.
pub const em_iterations_key: &str = "em_iterations";
/// Default number of EM rounds.
pub const em_iterations_default: usize = 10;
/// Key of the reasoner to use.
pub const em_reasoner_key: &str = "em_reasoner";
/// Default reasoner.
pub const em_reasoner_default: &str = "admm";
/// Key of the free atoms policy.
pub const em_free_key: &str = "em_free";

/// Which ground atoms the reasoner may change during an E-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreeAtoms {
    /// Label atoms are pinned to their observed values, everything else the
    /// reasoner holds is optimized.
    Unlabeled,
    /// Label atoms are pinned to their observed values, and atoms that are
    /// neither labels nor latent are pinned to their value in the random
    /// variable view. Only latent atoms move.
    LatentOnly,
}
impl FreeAtoms {
    /// String representation used on the command line.
    pub fn as_str(&self) -> &'static str {
        match *self {
            FreeAtoms::Unlabeled => "unlabeled",
            FreeAtoms::LatentOnly => "latent_only",
        }
    }

    /// Parses the command line representation.
    pub fn of_str(s: &str) -> Option<Self> {
        match s {
            "unlabeled" => Some(FreeAtoms::Unlabeled),
            "latent_only" | "latent" => Some(FreeAtoms::LatentOnly),
            _ => None,
        }
    }
}
impl Default for FreeAtoms {
    fn default() -> Self {
        FreeAtoms::Unlabeled
    }
}
impl fmt::Display for FreeAtoms {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// Expectation-maximization configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EmConf {
    /// Number of EM rounds.
    pub iterations: usize,
    /// Name of the reasoner factory used by sessions.
    pub reasoner: String,
    /// Atoms the E-step is allowed to change.
    pub free: FreeAtoms,
}
impl Default for EmConf {
    fn default() -> Self {
        EmConf {
            iterations: em_iterations_default,
            reasoner: em_reasoner_default.into(),
            free: FreeAtoms::default(),
        }
    }
}
impl EmConf {
    /// Sets the number of rounds.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the reasoner.
    pub fn with_reasoner<S: Into<String>>(mut self, reasoner: S) -> Self {
        self.reasoner = reasoner.into();
        self
    }

    /// Sets the free atoms policy.
    pub fn with_free(mut self, free: FreeAtoms) -> Self {
        self.free = free;
        self
    }

    /// Adds clap options to a clap `App`.
    pub fn add_args(app: App, mut order: usize) -> App {
        let mut order = || {
            order += 1;
            order
        };

        app.arg(
            Arg::new(em_iterations_key)
                .long(em_iterations_key)
                .help("sets the number of expectation-maximization rounds")
                .validator(int_validator)
                .value_name("int")
                .default_value("10")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::new(em_reasoner_key)
                .long(em_reasoner_key)
                .help("sets the reasoner used for inference")
                .value_name("name")
                .default_value(em_reasoner_default)
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
        .arg(
            Arg::new(em_free_key)
                .long(em_free_key)
                .help("atoms the E-step may change")
                .validator(free_validator)
                .value_name(free_format)
                .default_value("unlabeled")
                .takes_value(true)
                .number_of_values(1)
                .display_order(order()),
        )
    }

    /// Creates itself from some matches.
    ///
    /// Assumes the matches come from an app extended with
    /// [`add_args`](#method.add_args).
    pub fn new(matches: &Matches) -> Self {
        let iterations = int_of_matches(matches, em_iterations_key);
        let reasoner = matches
            .value_of(em_reasoner_key)
            .unwrap_or(em_reasoner_default)
            .to_string();
        let free = matches
            .value_of(em_free_key)
            .and_then(FreeAtoms::of_str)
            .unwrap_or_default();
        EmConf {
            iterations,
            reasoner,
            free,
        }
    }

    /// Parses some command line arguments, the first one being the binary
    /// name.
    pub fn of_args<I, T>(args: I) -> Res<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<::std::ffi::OsString> + Clone,
    {
        let matches = app()
            .try_get_matches_from(args)
            .map_err(|e| ErrorKind::Configuration(e.to_string()))?;
        Ok(EmConf::new(&matches))
    }
}

/// Clap application with the EM options only.
pub fn app() -> App {
    EmConf::add_args(
        App::new(crate_name!())
            .version(crate_version!())
            .about("Expectation-maximization weight learning with latent variables."),
        0,
    )
}

/// Format for the free atoms policy.
pub static free_format: &str = "unlabeled|latent_only";

/// Integer of some matches.
///
/// Assumes a default is provided and the input has been validated with
/// `int_validator`.
pub fn int_of_matches(matches: &Matches, key: &str) -> usize {
    matches
        .value_of(key)
        .and_then(|s| s.parse::<usize>().ok())
        .expect("failed to retrieve integer argument")
}

/// Validates integer input.
pub fn int_validator(s: &str) -> Result<(), String> {
    match s.parse::<usize>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("expected an integer, got `{}`", s)),
    }
}

/// Validates free atoms policy input.
pub fn free_validator(s: &str) -> Result<(), String> {
    if FreeAtoms::of_str(s).is_some() {
        Ok(())
    } else {
        Err(format!("expected `{}`, got `{}`", free_format, s))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let conf = EmConf::of_args(vec!["latent"]).unwrap();
        assert_eq!(conf, EmConf::default());
        assert_eq!(conf.iterations, 10);
        assert_eq!(conf.reasoner, "admm");
        assert_eq!(conf.free, FreeAtoms::Unlabeled);
    }

    #[test]
    fn explicit_values() {
        let conf = EmConf::of_args(vec![
            "latent",
            "--em_iterations",
            "3",
            "--em_reasoner",
            "scripted",
            "--em_free",
            "latent_only",
        ])
        .unwrap();
        assert_eq!(conf.iterations, 3);
        assert_eq!(conf.reasoner, "scripted");
        assert_eq!(conf.free, FreeAtoms::LatentOnly);
    }

    #[test]
    fn zero_iterations_accepted() {
        let conf = EmConf::of_args(vec!["latent", "--em_iterations", "0"]).unwrap();
        assert_eq!(conf.iterations, 0)
    }

    #[test]
    fn bad_values_rejected() {
        for bad in &[
            vec!["latent", "--em_iterations", "-1"],
            vec!["latent", "--em_iterations", "ten"],
            vec!["latent", "--em_free", "everything"],
        ] {
            let err = EmConf::of_args(bad.clone()).unwrap_err();
            assert!(err.is_configuration(), "{:?}: {}", bad, err)
        }
    }
}
