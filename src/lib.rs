#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for repo-census
//!
//! This library holds all functionality of the `repo-census` tool, which samples public
//! repository metadata from the GitHub search API and balances the result by star count.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`config`]: Run configuration and its defaults
//! - [`collect`]: Windowed search collection with adaptive splitting and backoff
//! - [`balance`]: Star-count stratified sampling
//! - [`dataset`]: Tabular dataset records and their CSV/Excel persistence

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod balance;
pub mod collect;
pub mod commands;
pub mod config;
pub mod dataset;

pub use crate::commands::{Host, run};
