pub mod config;
pub mod rest;
pub mod run;
