#![deny(unsafe_code)]

pub mod assets;
pub mod config;
pub mod graft;
pub mod opts;
pub mod pbxproj;
pub mod util;

pub static NAME: &str = "pbxgraft";
