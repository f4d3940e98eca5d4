#![allow(dead_code)]

pub use watchrun_test_utils::{builders, fake_executor, init_tracing, wait_until, with_timeout};
