//! This module contains logging and environment config
//! used by the buildbot library

pub mod env;
pub mod log;
