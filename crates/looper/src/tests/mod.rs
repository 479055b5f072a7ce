//! Test suites for the `looper` runtime.

pub(crate) mod support;
