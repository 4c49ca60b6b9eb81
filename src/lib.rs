//! Library entry for gen-localization exposing the pipeline for integration tests.

pub mod app;
pub mod args;
pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod tools;
pub mod translate;
