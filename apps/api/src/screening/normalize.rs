//! Collapses the varied shapes the scoring model returns into one verdict.

use serde::Serialize;
use serde_json::Value;

pub const ALL_SKILLS_PRESENT: &str = "all required skills are there";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningVerdict {
    /// 0 – 100, `None` when the model gave nothing numeric.
    pub score: Option<i32>,
    pub required_skills: Vec<String>,
    pub feedback: String,
    pub short_summary: String,
}

impl ScreeningVerdict {
    pub fn from_model(value: &Value) -> Self {
        Self {
            score: value.get("score").and_then(parse_score),
            required_skills: normalize_skills(
                value
                    .get("required_skills")
                    .or_else(|| value.get("missing_skills")),
            ),
            feedback: first_text(value, &["feedback", "comments"]),
            short_summary: first_text(value, &["short_summary", "summary"]),
        }
    }

    /// Feedback as persisted: the summary (if any) leads, separated by a blank line.
    pub fn combined_feedback(&self) -> String {
        if self.short_summary.is_empty() {
            self.feedback.clone()
        } else {
            format!("{}\n\n{}", self.short_summary, self.feedback)
        }
    }

    pub fn skills_csv(&self) -> String {
        self.required_skills.join(", ")
    }
}

fn parse_score(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| raw.round().clamp(0.0, 100.0) as i32)
}

fn normalize_skills(value: Option<&Value>) -> Vec<String> {
    let skills: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => vec![],
    };

    if skills.is_empty() {
        vec![ALL_SKILLS_PRESENT.to_string()]
    } else {
        skills
    }
}

fn first_text(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| match value.get(*k) {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_default()
}
