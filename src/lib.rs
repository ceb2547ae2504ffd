//MIT License
#![allow(non_camel_case_types)]
pub mod global;
pub mod numerical;
pub mod symbolic;
