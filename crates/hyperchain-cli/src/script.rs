//! Message scripts
//!
//! A script is a JSON array of steps replayed against a [`Host`]:
//!
//! ```json
//! [
//!   { "step": "deliver", "msg": { "type": "create_bridge", "signer": "nmx1admin", ... } },
//!   { "step": "next_block" },
//!   { "step": "query", "query": { "type": "list_bridges" } }
//! ]
//! ```

use hyperchain_bridge::{Event, Host, Msg, Query};
use serde::{Deserialize, Serialize};

fn one() -> u64 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Execute one message in the current block
    Deliver { msg: serde_json::Value },
    /// Run a read-only query against committed state
    Query { query: Query },
    /// Open `count` new blocks
    NextBlock {
        #[serde(default = "one")]
        count: u64,
    },
}

/// Result of one step
#[derive(Clone, Debug, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub height: u64,
    pub kind: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    pub result: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

pub fn parse(content: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_json::from_str(content)?)
}

/// Replay every step; failures are recorded and do not stop the script
pub fn run(host: &mut Host, steps: &[Step]) -> Vec<StepOutcome> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| run_step(host, index, step))
        .collect()
}

fn run_step(host: &mut Host, index: usize, step: &Step) -> StepOutcome {
    let height = host.header().height;
    match step {
        Step::Deliver { msg } => {
            let outcome = Msg::from_value(msg.clone()).and_then(|msg| {
                let response = host.deliver(&msg)?;
                Ok((msg.type_name().to_string(), response))
            });
            match outcome {
                Ok((kind, response)) => StepOutcome {
                    index,
                    height,
                    kind,
                    ok: true,
                    code: None,
                    result: serde_json::to_value(&response).unwrap_or_default(),
                    events: host.take_events(),
                },
                Err(err) => StepOutcome {
                    index,
                    height,
                    kind: msg
                        .get("type")
                        .and_then(|t| t.as_str())
                        .unwrap_or("unknown")
                        .to_string(),
                    ok: false,
                    code: Some(err.code()),
                    result: serde_json::Value::String(err.to_string()),
                    events: Vec::new(),
                },
            }
        }
        Step::Query { query } => match host.querier().run(query) {
            Ok(result) => StepOutcome {
                index,
                height,
                kind: "query".into(),
                ok: true,
                code: None,
                result,
                events: Vec::new(),
            },
            Err(err) => StepOutcome {
                index,
                height,
                kind: "query".into(),
                ok: false,
                code: Some(err.code()),
                result: serde_json::Value::String(err.to_string()),
                events: Vec::new(),
            },
        },
        Step::NextBlock { count } => {
            for _ in 0..*count {
                host.advance_block();
            }
            StepOutcome {
                index,
                height: host.header().height,
                kind: "next_block".into(),
                ok: true,
                code: None,
                result: serde_json::json!({ "time": host.now() }),
                events: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;

    const SCRIPT: &str = r#"[
        { "step": "deliver", "msg": {
            "type": "create_bridge", "signer": "nmx1admin",
            "source_chain_id": "alpha", "target_chain_id": "beta",
            "min_relayers": 1, "supported_tokens": ["gold"] } },
        { "step": "next_block", "count": 2 },
        { "step": "query", "query": { "type": "list_bridges" } },
        { "step": "deliver", "msg": { "type": "bogus", "signer": "nmx1admin" } },
        { "step": "query", "query": { "type": "get_bridge", "bridge_id": "missing" } }
    ]"#;

    #[test]
    fn test_script_replay() {
        let mut host = CliConfig::example().build_host().unwrap();
        let steps = parse(SCRIPT).unwrap();
        let outcomes = run(&mut host, &steps);

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes[0].ok);
        assert_eq!(outcomes[0].kind, "create_bridge");
        assert!(outcomes[0].result["bridge_id"].is_string());
        assert_eq!(outcomes[0].events.len(), 1);

        assert_eq!(outcomes[1].height, outcomes[0].height + 2);
        assert!(outcomes[2].ok);
        assert_eq!(outcomes[2].result["pagination"]["total"], 1);

        assert!(!outcomes[3].ok);
        assert_eq!(outcomes[3].kind, "bogus");
        assert!(!outcomes[4].ok);
        assert!(outcomes[4].code.is_some());
    }

    #[test]
    fn test_next_block_defaults_to_one() {
        let steps = parse(r#"[{ "step": "next_block" }]"#).unwrap();
        assert!(matches!(steps[0], Step::NextBlock { count: 1 }));
    }
}
