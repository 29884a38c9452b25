//! Pure numerology calculation pipeline.
//!
//! This crate contains the deterministic core of the numerology service: the
//! digit-reduction arithmetic, the Pythagorean letter table, the canned
//! interpretation texts, and the request/response wire types. Everything here
//! is a synchronous pure function over its arguments and a handful of static
//! tables, so the whole pipeline can be called concurrently from any number
//! of requests without synchronization. HTTP, authentication, and throttling
//! live in the server crate and never leak into this one.

pub mod calculator;
pub mod interpretation;
pub mod reduction;
pub mod report;

pub use calculator::{life_path, name_number};
pub use interpretation::{interpretation, DEFAULT_INTERPRETATION};
pub use reduction::{reduce, MASTER_NUMBERS};
pub use report::{
    build_report, NumerologyReport, NumerologyRequest, NumerologyResponse, ReportItem,
};
