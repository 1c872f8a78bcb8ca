//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod evolve;
pub(crate) mod inspect;
pub(crate) mod plan;
