//! demandboard: demand plan dashboard.
//!
//! Loads a weekly demand plan and sales history, and serves them as
//! overview charts, a SKU × date plan table and an agent-backed chat.

pub mod agent;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod grid;
pub mod history;
pub mod web;
