#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod fetch;

#[cfg(feature = "test-utils")]
pub mod testing;
