//! Process-wide tracing setup shared by the binary and the black-box tests.

mod subscriber;

pub use subscriber::{LogFormat, init, init_with};
