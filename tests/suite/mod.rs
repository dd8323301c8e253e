//! Integration test suite modules

mod celebration;
mod config;
mod wish;
