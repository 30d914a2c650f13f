//! Test utilities for GremLite integration tests
//!
//! `TestFixture` builds the sample household schema and, on request, the
//! sample data set: three people, two houses and two pets.

#![allow(dead_code)]

pub mod test_fixture;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
