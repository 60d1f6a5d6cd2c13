//! Macros.

/// Logs at info level, using `info!`. Inactive in bench mode.
#[cfg(feature = "bench")]
macro_rules! log_info {
    ($($tt:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "bench"))]
macro_rules! log_info {
    ($($tt:tt)*) => {
        info! {$($tt)*}
    };
}

/// Logs at debug level. Inactive in bench mode.
#[cfg(feature = "bench")]
macro_rules! log_debug {
    ($($tt:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "bench"))]
macro_rules! log_debug {
    ($($tt:tt)*) => {
        debug! {$($tt)*}
    };
}

/// Logs at warning level. Inactive in bench mode.
#[cfg(feature = "bench")]
macro_rules! log_warn {
    ($($tt:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "bench"))]
macro_rules! log_warn {
    ($($tt:tt)*) => {
        warn! {$($tt)*}
    };
}

/// Profiling macro.
///
/// Assumes its first argument has a `profiler()` method returning a
/// [`Profiler`][prof].
///
/// - `profile! { slf tick "scope", "sub" }` starts a timer,
/// - `profile! { slf mark "scope", "sub" }` stops it,
/// - `profile! { slf wrap { ... } "scope" }` times a block,
/// - `profile! { slf "stat" => add n }` bumps a counter.
///
/// [prof]: profiling/struct.Profiler.html (Profiler struct)
#[macro_export]
macro_rules! profile {
    ( $slf:ident tick $( $scope:expr ),+ $(,)* ) => {
        $slf.profiler().tick(vec![ $($scope),+ ])
    };
    ( $slf:ident mark $( $scope:expr ),+ $(,)* ) => {
        $slf.profiler().mark(vec![ $($scope),+ ])
    };
    ( $slf:ident wrap $b:block $( $scope:expr ),+ $(,)* ) => {{
        profile! { $slf tick $($scope),+ }
        let res = $b;
        profile! { $slf mark $($scope),+ }
        res
    }};
    ( $slf:ident $stat:expr => add $e:expr ) => {
        $slf.profiler().stat_do($stat, |val| val + $e)
    };
}
