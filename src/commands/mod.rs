#![allow(clippy::needless_pass_by_value)]

pub mod artifact;
pub mod convert;
pub mod list;
pub mod task;
