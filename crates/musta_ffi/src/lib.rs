//! Flutter bridge surface for the Musta core.

pub mod api;
