//! Answer a yield question from the local chain snapshots

use std::process::ExitCode;

use clap::Parser;

use starkfinder_backend::config::YieldsConfig;
use starkfinder_backend::yields::{generate_suggestion, InferenceClient};

const DEFAULT_QUERY: &str = "Which protocols on solana have the highest APY?";

#[derive(Parser, Debug)]
#[command(name = "yield_advisor")]
#[command(about = "Find the riskiest and highest-APY protocols for a chain named in a question")]
struct Args {
    /// Rewrite the answer through the hosted text-generation model
    #[arg(long, default_value_t = false)]
    enhance: bool,

    /// Free-text question mentioning a chain, e.g. "best APY on solana"
    question: Vec<String>,
}

impl Args {
    fn query(&self) -> String {
        if self.question.is_empty() {
            DEFAULT_QUERY.to_string()
        } else {
            self.question.join(" ")
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let query = args.query();
    let config = YieldsConfig::from_env();
    let suggestion = generate_suggestion(&config.data_dir, &query);

    let reply = if args.enhance {
        enhance_reply(&config, &query, suggestion).await
    } else {
        suggestion
    };

    println!("{reply}");
    ExitCode::SUCCESS
}

/// Rewrite the suggestion through the inference endpoint, keeping it on failure
async fn enhance_reply(config: &YieldsConfig, query: &str, suggestion: String) -> String {
    let client = match InferenceClient::new(
        &config.inference_url,
        config.inference_token.clone(),
        config.request_timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Inference client unavailable: {}", e);
            return suggestion;
        }
    };

    let prompt = format!("{suggestion}\n\nQuestion: {query}\nAnswer:");
    match client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Inference failed, using local summary: {}", e);
            suggestion
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_question_words_are_joined() {
        let args =
            Args::try_parse_from(["yield_advisor", "--enhance", "best", "APY", "on", "solana"])
                .unwrap();
        assert!(args.enhance);
        assert_eq!(args.query(), "best APY on solana");
    }

    #[test]
    fn test_default_question() {
        let args = Args::try_parse_from(["yield_advisor"]).unwrap();
        assert!(!args.enhance);
        assert_eq!(args.query(), DEFAULT_QUERY);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Args::try_parse_from(["yield_advisor", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
