//! Library side of the `cardio` binary.

pub mod logging;
