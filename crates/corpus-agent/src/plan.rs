//! Plan generation contract and the plan parser.
//!
//! The planner is free-form (an external model produces a string); the
//! parser is the strict boundary that turns that string into a typed
//! `Plan`. Anything that fits neither the terminal sentinel nor the
//! tool-call grammar is a `PlanError`, reported as its own abort reason
//! rather than being silently dropped.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{AgentError, PlanError};
use crate::perception::Perception;
use crate::provenance::{extract_refs, AnswerRefs};

/// Sentinel marking a plan as the final answer.
pub const FINAL_ANSWER_PREFIX: &str = "FINAL_ANSWER:";
/// Prefix marking a plan as a tool invocation.
pub const FUNCTION_CALL_PREFIX: &str = "FUNCTION_CALL:";

/// A parsed plan: either terminate with an answer or call one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Final answer. `answer` is the full plan string, sentinel included;
    /// `refs` are the source references embedded in it.
    Terminal { answer: String, refs: AnswerRefs },

    /// One tool invocation with a JSON-object argument map.
    ToolCall { name: String, args: Value },
}

impl Plan {
    /// Parse a raw planner output.
    ///
    /// Accepted shapes:
    /// - `FINAL_ANSWER: <anything>`
    /// - `FUNCTION_CALL: <name>`
    /// - `FUNCTION_CALL: <name>|{"key": "value"}`
    /// - `FUNCTION_CALL: <name>|key=value|key2=value2`
    pub fn parse(raw: &str) -> Result<Plan, PlanError> {
        let trimmed = raw.trim();

        if trimmed.starts_with(FINAL_ANSWER_PREFIX) {
            return Ok(Plan::Terminal {
                answer: trimmed.to_string(),
                refs: extract_refs(trimmed),
            });
        }

        if let Some(rest) = trimmed.strip_prefix(FUNCTION_CALL_PREFIX) {
            return parse_tool_call(rest.trim());
        }

        Err(PlanError::Unrecognized(preview(trimmed)))
    }
}

fn parse_tool_call(body: &str) -> Result<Plan, PlanError> {
    let mut segments = body.split('|');

    let name = segments
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        return Err(PlanError::BadArguments("missing tool name".to_string()));
    }
    if name.contains(char::is_whitespace) {
        return Err(PlanError::BadArguments(format!(
            "tool name contains whitespace: {name}"
        )));
    }

    let args: Vec<&str> = segments.map(str::trim).collect();
    let args = parse_args(&args)?;

    Ok(Plan::ToolCall { name, args })
}

fn parse_args(segments: &[&str]) -> Result<Value, PlanError> {
    match segments {
        [] => Ok(Value::Object(Map::new())),
        [single] if single.starts_with('{') => {
            let value: Value = serde_json::from_str(single)
                .map_err(|e| PlanError::BadArguments(format!("invalid JSON arguments: {e}")))?;
            if value.is_object() {
                Ok(value)
            } else {
                Err(PlanError::BadArguments(
                    "JSON arguments must be an object".to_string(),
                ))
            }
        }
        segments if segments.iter().any(|s| s.starts_with('{')) => Err(PlanError::BadArguments(
            "JSON arguments must be the only segment".to_string(),
        )),
        segments => {
            let mut map = Map::new();
            for segment in segments {
                let (key, value) = segment.split_once('=').ok_or_else(|| {
                    PlanError::BadArguments(format!("expected key=value, got: {segment}"))
                })?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(PlanError::BadArguments(format!(
                        "empty key in segment: {segment}"
                    )));
                }
                map.insert(key.to_string(), Value::String(value.trim().to_string()));
            }
            Ok(Value::Object(map))
        }
    }
}

fn preview(s: &str) -> String {
    const LIMIT: usize = 80;
    if s.chars().count() > LIMIT {
        let head: String = s.chars().take(LIMIT).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// Produces the next plan string from the current perception, retrieved
/// memory, and the tool catalog summary. Implemented by the external
/// planning service.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(
        &self,
        perception: &Perception,
        memories: &[String],
        catalog: &str,
    ) -> Result<String, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_terminal() {
        let plan = Plan::parse("FINAL_ANSWER: The total is 42.").unwrap();
        match plan {
            Plan::Terminal { answer, refs } => {
                assert_eq!(answer, "FINAL_ANSWER: The total is 42.");
                assert!(refs.is_empty());
            }
            other => panic!("expected terminal, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_terminal_keeps_sentinel_after_trim() {
        let plan = Plan::parse("  FINAL_ANSWER: done\n").unwrap();
        match plan {
            Plan::Terminal { answer, .. } => assert_eq!(answer, "FINAL_ANSWER: done"),
            other => panic!("expected terminal, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_terminal_extracts_refs() {
        let raw = "FINAL_ANSWER: See the Q3 figures.\n[Source path: /docs/q3.pdf]\nChunk ID: q3_2";
        let plan = Plan::parse(raw).unwrap();
        match plan {
            Plan::Terminal { refs, .. } => {
                assert_eq!(refs.paths, vec!["/docs/q3.pdf".to_string()]);
                assert_eq!(refs.chunk_ids, vec!["q3_2".to_string()]);
            }
            other => panic!("expected terminal, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tool_call_json_args() {
        let plan = Plan::parse(r#"FUNCTION_CALL: get_weather|{"city": "Oslo", "days": 3}"#).unwrap();
        assert_eq!(
            plan,
            Plan::ToolCall {
                name: "get_weather".to_string(),
                args: json!({"city": "Oslo", "days": 3}),
            }
        );
    }

    #[test]
    fn test_parse_tool_call_pair_args() {
        let plan = Plan::parse("FUNCTION_CALL: search|query=rust traits|limit=5").unwrap();
        assert_eq!(
            plan,
            Plan::ToolCall {
                name: "search".to_string(),
                args: json!({"query": "rust traits", "limit": "5"}),
            }
        );
    }

    #[test]
    fn test_parse_tool_call_no_args() {
        let plan = Plan::parse("FUNCTION_CALL: list_files").unwrap();
        assert_eq!(
            plan,
            Plan::ToolCall {
                name: "list_files".to_string(),
                args: json!({}),
            }
        );
    }

    #[test]
    fn test_pair_value_may_contain_equals() {
        let plan = Plan::parse("FUNCTION_CALL: fetch|url=https://x.test/?a=1&b=2").unwrap();
        assert_eq!(
            plan,
            Plan::ToolCall {
                name: "fetch".to_string(),
                args: json!({"url": "https://x.test/?a=1&b=2"}),
            }
        );
    }

    #[test]
    fn test_reject_invalid_json_args() {
        let err = Plan::parse("FUNCTION_CALL: t|{broken").unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));
    }

    #[test]
    fn test_reject_non_object_json_args() {
        let err = Plan::parse("FUNCTION_CALL: t|[1, 2]").unwrap_err();
        // An array is not a JSON segment, so it falls through to key=value
        assert!(matches!(err, PlanError::BadArguments(_)));

        let err = Plan::parse(r#"FUNCTION_CALL: t|{"a": 1}|extra=1"#).unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));
    }

    #[test]
    fn test_reject_missing_name() {
        let err = Plan::parse("FUNCTION_CALL: |x=1").unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));

        let err = Plan::parse("FUNCTION_CALL:").unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));
    }

    #[test]
    fn test_reject_name_with_whitespace() {
        let err = Plan::parse("FUNCTION_CALL: do something|x=1").unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));
    }

    #[test]
    fn test_reject_pair_without_equals() {
        let err = Plan::parse("FUNCTION_CALL: t|justtext").unwrap_err();
        assert!(matches!(err, PlanError::BadArguments(_)));
    }

    #[test]
    fn test_reject_unrecognized_text() {
        let err = Plan::parse("I think we should look at the data first.").unwrap_err();
        assert!(matches!(err, PlanError::Unrecognized(_)));

        let err = Plan::parse("").unwrap_err();
        assert!(matches!(err, PlanError::Unrecognized(_)));
    }

    #[test]
    fn test_unrecognized_preview_truncates() {
        let long = "x".repeat(200);
        let err = Plan::parse(&long).unwrap_err();
        match err {
            PlanError::Unrecognized(preview) => {
                assert!(preview.len() < 100);
                assert!(preview.ends_with("..."));
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }
}
