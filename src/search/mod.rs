//! External content search (Exa)

mod exa;

pub use exa::{CompetitorResult, ExaClient};
