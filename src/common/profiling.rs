#![doc = r#"Profiling stuff.

A profiler maintains durations for scopes (`vec!["em", "e-step"]`) and some
named counters. Internally, the structures are wrapped in `RefCell`s so that
mutation does not require `& mut self`.
"#]

use std::cell::RefCell;
use std::time::{Duration, Instant};

use crate::common::*;

/// Maps strings to counters.
pub type Stats = HashMap<String, usize>;

/// Profiling structure.
pub struct Profiler {
    /// Scope-indexed durations.
    map: RefCell<HashMap<Vec<&'static str>, (Option<Instant>, Duration)>>,
    /// Starting tick, for total time.
    start: Instant,
    /// Other statistics.
    stats: RefCell<Stats>,
}
impl Default for Profiler {
    fn default() -> Self {
        Profiler::new()
    }
}
impl Profiler {
    /// Constructor.
    pub fn new() -> Self {
        Profiler {
            map: RefCell::new(HashMap::default()),
            start: Instant::now(),
            stats: RefCell::new(HashMap::default()),
        }
    }

    /// Acts on a statistic.
    pub fn stat_do<F, S>(&self, stat: S, f: F)
    where
        F: Fn(usize) -> usize,
        S: Into<String>,
    {
        let stat = stat.into();
        let mut map = self.stats.borrow_mut();
        let val = map.get(&stat).cloned().unwrap_or(0);
        let _ = map.insert(stat, f(val));
    }

    /// Value of a statistic, `0` if it was never touched.
    pub fn stat(&self, stat: &str) -> usize {
        self.stats.borrow().get(stat).cloned().unwrap_or(0)
    }

    /// Ticks.
    pub fn tick(&self, scope: Vec<&'static str>) {
        if scope.is_empty() {
            panic!("Profile: can't use scope `total`")
        }
        let mut map = self.map.borrow_mut();
        let time = map
            .entry(scope)
            .or_insert_with(|| (None, Duration::from_secs(0)));
        time.0 = Some(Instant::now())
    }

    /// Registers the time since the last tick.
    ///
    /// Panics if there was no tick since the last time registration.
    pub fn mark(&self, scope: Vec<&'static str>) {
        if scope.is_empty() {
            panic!("Profile: can't use scope `total`")
        }
        let mut map = self.map.borrow_mut();
        if let Some(&mut (ref mut tick, ref mut sum)) = map.get_mut(&scope) {
            if let Some(instant) = tick.take() {
                *sum += Instant::now().duration_since(instant)
            }
        } else {
            panic!("profiling: trying to mark the time without ticking first")
        }
    }

    /// Total duration registered for a scope.
    pub fn duration(&self, scope: &[&'static str]) -> Duration {
        self.map
            .borrow()
            .get(scope)
            .map(|&(_, time)| time)
            .unwrap_or_else(|| Duration::from_secs(0))
    }

    /// Extracts the durations and the statistics.
    pub fn extract(self) -> (HashMap<Vec<&'static str>, Duration>, Stats) {
        let mut map = HashMap::default();
        for (scope, &(ref tick, ref time)) in self.map.borrow().iter() {
            if tick.is_some() {
                log_warn! {
                    "profiling: scope `{:?}` is still live but asked to extract", scope
                }
            }
            let _ = map.insert(scope.clone(), *time);
        }
        let prev = map.insert(vec!["total"], Instant::now().duration_since(self.start));
        debug_assert!(prev.is_none());
        (map, self.stats.into_inner())
    }
}
