#![cfg_attr(test, allow(unused_crate_dependencies))]

mod fetch;

pub use fetch::NativeFetcher;
