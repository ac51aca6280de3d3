pub mod analysis;
pub mod coding;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod providers;
pub mod rating;
pub mod stats;

pub mod doctor;

pub mod report;
pub mod storage;
