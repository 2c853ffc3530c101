//! Wire types shared between the logicsweeper client and the reasoning backend.

pub mod models;
pub mod protocol;
