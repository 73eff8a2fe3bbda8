//! Command implementations.

mod run;

pub use run::{
    Outcome,
    RunArgs,
    run,
};
