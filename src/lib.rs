pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod logging;
pub mod scanner;
