//! Targets used with the `log` macros, so output can be filtered per
//! subsystem, e.g. `RUST_LOG=propagation=trace`.

pub mod targets {
    pub const PROPAGATION: &str = "propagation";
    pub const PURE_LITERALS: &str = "pure_literals";
    pub const DECISION: &str = "decision";
    pub const BACKTRACK: &str = "backtrack";
    pub const PARSE: &str = "parse";
    pub const SOLVE: &str = "solve";
}
