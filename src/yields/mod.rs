//! DeFi yield snapshots and the risk/APY advisor
//!
//! [`client::YieldsClient`] pulls the aggregator's pool list, [`snapshot`]
//! groups it into one JSON file per chain, and [`analysis`] answers free-text
//! questions from those files. [`inference::InferenceClient`] optionally
//! rewrites the answer through a hosted text-generation model.

use std::path::PathBuf;

use thiserror::Error;

pub mod analysis;
pub mod client;
pub mod inference;
pub mod snapshot;

pub use analysis::{analyze_risks, detect_chain, generate_suggestion, render_summary, RiskAnalysis};
pub use client::YieldsClient;
pub use inference::InferenceClient;
pub use snapshot::{
    available_chains, group_by_chain, load_chain_data, write_snapshots, ChainSnapshot,
};

#[derive(Error, Debug)]
pub enum YieldError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data found for chain: {0}")]
    NoData(String),

    #[error("Invalid data format: {0}")]
    InvalidData(String),

    #[error("Error querying model: {status}, {body}")]
    Inference { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl YieldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        YieldError::Io {
            path: path.into(),
            source,
        }
    }
}
