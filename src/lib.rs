//! Career accelerator marketing dashboard.
//!
//! Loads the five-sheet marketing workbook, filters the customer sheet,
//! aggregates the competitor, marketing, survey and enrollment sheets, and
//! renders the result with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod ui;
