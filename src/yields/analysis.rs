//! Risk and APY lookups over a chain snapshot

use std::path::Path;

use serde_json::Value;

use super::snapshot::{available_chains, load_chain_data, ChainSnapshot};
use super::YieldError;

const RISK_FIELD: &str = "ilRisk";
const APY_FIELD: &str = "apyBase";

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAnalysis {
    pub highest_risk: Option<Value>,
    pub highest_apy: Option<Value>,
    pub total_protocols: usize,
}

/// First chain name contained in the lowercased query, longest names first
pub fn detect_chain(query: &str, chains: &[String]) -> Option<String> {
    let query = query.to_lowercase();
    let mut candidates: Vec<&String> = chains.iter().collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    candidates
        .into_iter()
        .find(|chain| !chain.is_empty() && query.contains(chain.to_lowercase().as_str()))
        .cloned()
}

/// Record with the largest numeric `field`; ties keep the earliest record
fn max_by_field<'a>(protocols: &'a [Value], field: &str) -> Option<&'a Value> {
    let mut best: Option<(&Value, f64)> = None;
    for protocol in protocols {
        let Some(value) = protocol.get(field).and_then(Value::as_f64) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((protocol, value)),
        }
    }
    best.map(|(protocol, _)| protocol)
}

pub fn analyze_risks(snapshot: &ChainSnapshot) -> Result<RiskAnalysis, YieldError> {
    let protocols = snapshot
        .protocols
        .as_array()
        .ok_or_else(|| YieldError::InvalidData("'protocols' should be a list.".to_string()))?;

    Ok(RiskAnalysis {
        highest_risk: max_by_field(protocols, RISK_FIELD).cloned(),
        highest_apy: max_by_field(protocols, APY_FIELD).cloned(),
        total_protocols: protocols.len(),
    })
}

fn describe_protocol(protocol: &Value, field: &str) -> String {
    let project = protocol.get("project").and_then(Value::as_str);
    let symbol = protocol.get("symbol").and_then(Value::as_str);
    let value = protocol.get(field).map(Value::to_string);

    match (project, value) {
        (Some(project), Some(value)) => match symbol {
            Some(symbol) => format!("{project} ({symbol}): {field} = {value}"),
            None => format!("{project}: {field} = {value}"),
        },
        _ => protocol.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_summary(chain: &str, analysis: &RiskAnalysis) -> String {
    let highest_risk = analysis
        .highest_risk
        .as_ref()
        .map(|p| describe_protocol(p, RISK_FIELD))
        .unwrap_or_else(|| format!("No protocols with valid {RISK_FIELD} data."));
    let highest_apy = analysis
        .highest_apy
        .as_ref()
        .map(|p| describe_protocol(p, APY_FIELD))
        .unwrap_or_else(|| format!("No protocols with valid {APY_FIELD} data."));

    format!(
        "Based on the latest data for {}:\n\
         - The protocol with the highest risk is: {}\n\
         - The protocol offering the highest APY is: {}\n\
         - Total number of protocols analyzed: {}\n\
         \n\
         Please consider your risk tolerance before investing. Let me know if you'd like more details!",
        capitalize(chain),
        highest_risk,
        highest_apy,
        analysis.total_protocols
    )
}

/// Answer a free-text question from the snapshots in `dir`; failures become the reply text
pub fn generate_suggestion(dir: &Path, query: &str) -> String {
    let chains = match available_chains(dir) {
        Ok(chains) => chains,
        Err(e) => return format!("An error occurred: {e}"),
    };

    let Some(chain) = detect_chain(query, &chains) else {
        return "I couldn't identify the chain from your query. Please specify the chain name."
            .to_string();
    };

    match load_chain_data(dir, &chain).and_then(|snapshot| analyze_risks(&snapshot)) {
        Ok(analysis) => render_summary(&chain, &analysis),
        Err(e) => {
            tracing::warn!(chain = %chain, error = %e, "Could not analyze chain data");
            format!("An error occurred: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(protocols: Value) -> ChainSnapshot {
        ChainSnapshot {
            timestamp: None,
            chain: "solana".to_string(),
            count: protocols.as_array().map_or(0, Vec::len),
            protocols,
        }
    }

    fn chains(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_chain_prefers_longer_names() {
        let known = chains(&["arbitrum", "arbitrum nova", "sol", "solana"]);
        assert_eq!(
            detect_chain("Best APY on Solana?", &known).as_deref(),
            Some("solana")
        );
        assert_eq!(
            detect_chain("anything on ARBITRUM NOVA", &known).as_deref(),
            Some("arbitrum nova")
        );
        assert_eq!(detect_chain("what about tron", &known), None);
    }

    #[test]
    fn test_analyze_skips_non_numeric_and_keeps_first_maximum() {
        let analysis = analyze_risks(&snapshot(json!([
            {"project": "a", "ilRisk": "high", "apyBase": 3.0},
            {"project": "b", "ilRisk": 2, "apyBase": 9.5},
            {"project": "c", "ilRisk": 2, "apyBase": null},
            {"project": "d", "apyBase": 9.5}
        ])))
        .unwrap();

        assert_eq!(analysis.highest_risk.unwrap()["project"], "b");
        assert_eq!(analysis.highest_apy.unwrap()["project"], "b");
        assert_eq!(analysis.total_protocols, 4);
    }

    #[test]
    fn test_analyze_empty_and_invalid() {
        let analysis = analyze_risks(&snapshot(json!([]))).unwrap();
        assert_eq!(analysis.highest_risk, None);
        assert_eq!(analysis.total_protocols, 0);

        let err = analyze_risks(&snapshot(json!({"not": "a list"}))).unwrap_err();
        assert!(matches!(err, YieldError::InvalidData(_)));
    }

    #[test]
    fn test_render_summary() {
        let analysis = RiskAnalysis {
            highest_risk: Some(json!({"project": "raydium", "symbol": "SOL-USDC", "ilRisk": 3})),
            highest_apy: None,
            total_protocols: 12,
        };
        let text = render_summary("solana", &analysis);

        assert!(text.starts_with("Based on the latest data for Solana:"));
        assert!(text.contains("highest risk is: raydium (SOL-USDC): ilRisk = 3"));
        assert!(text.contains("No protocols with valid apyBase data."));
        assert!(text.contains("Total number of protocols analyzed: 12"));
    }

    #[test]
    fn test_describe_falls_back_to_json() {
        let protocol = json!({"apyBase": 1.5});
        assert_eq!(describe_protocol(&protocol, APY_FIELD), r#"{"apyBase":1.5}"#);
    }

    #[test]
    fn test_generate_suggestion_reports_failures_inline() {
        let dir = tempfile::tempdir().unwrap();
        assert!(generate_suggestion(dir.path(), "solana yields?")
            .starts_with("I couldn't identify the chain"));

        std::fs::write(
            dir.path().join("solana.json"),
            r#"{"chain": "solana", "protocols": "oops", "count": 0}"#,
        )
        .unwrap();
        let reply = generate_suggestion(dir.path(), "solana yields?");
        assert!(reply.starts_with("An error occurred: Invalid data format"));
    }
}
