//! Shared argument types, logging setup and exit handling for the `crop`,
//! `framify` and `subscan` binaries.

pub mod args;
pub mod exit;
pub mod logging;
