//! Input generation and output parsing for the quantum chemistry programs
//! KinBot drives, plus the queue scripts that run them.

pub mod program;
pub mod queue;
