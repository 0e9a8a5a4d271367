use serde_json::Value;

use crate::models::{AnalysisRecord, RecordKind};

/// Turns an analysis record into an optional coaching line for the
/// submitter. Degraded records yield nothing.
pub trait FeedbackEngine: Send + Sync {
    fn feedback_for(&self, record: &AnalysisRecord) -> Option<String>;
}

/// Rule-based engine over the well-known analysis fields.
///
/// Fields it looks at are all optional; a payload without them falls
/// through to a generic line per kind.
pub struct TemplateFeedback;

impl FeedbackEngine for TemplateFeedback {
    fn feedback_for(&self, record: &AnalysisRecord) -> Option<String> {
        if record.is_degraded() {
            return None;
        }
        let message = match record.kind {
            RecordKind::Video => video_feedback(&record.payload),
            RecordKind::Screen => screen_feedback(&record.payload),
            RecordKind::Audio => {
                "Thank you for that response. Let's move on to the next question.".to_string()
            }
        };
        Some(message)
    }
}

fn video_feedback(analysis: &Value) -> String {
    let mut parts: Vec<String> = Vec::new();
    let engagement = analysis.get("engagement").and_then(Value::as_f64);

    if matches!(engagement, Some(e) if e < 5.0) {
        parts.push(
            "I notice you might want to sit up a bit straighter to show more engagement."
                .to_string(),
        );
    }

    if let Some(body_language) = analysis.get("body_language").and_then(Value::as_str) {
        let lowered = body_language.to_lowercase();
        if lowered.contains("slouching") || lowered.contains("closed") {
            parts.push("Try to maintain an open, confident posture.".to_string());
        } else if lowered.contains("confident") || lowered.contains("professional") {
            parts.push("Your body language looks very professional and confident.".to_string());
        }
    }

    match engagement {
        Some(e) if e < 4.0 => {
            parts.push("I'd like to see more enthusiasm in your responses.".to_string());
        }
        Some(e) if e > 7.0 => {
            parts.push("Your energy and engagement are excellent.".to_string());
        }
        _ => {}
    }

    if let Some(concerns) = analysis.get("concerns").and_then(Value::as_array) {
        let named: Vec<&str> = concerns.iter().filter_map(Value::as_str).take(2).collect();
        if !named.is_empty() {
            parts.push(format!(
                "I notice a few areas we might want to discuss: {}.",
                named.join(", ")
            ));
        }
    }

    if parts.is_empty() {
        "You're presenting yourself very well. Let's continue with the next question.".to_string()
    } else {
        parts.join(" ")
    }
}

fn screen_feedback(analysis: &Value) -> String {
    let mut parts: Vec<String> = Vec::new();

    rating_line(
        analysis,
        "code_quality",
        &mut parts,
        "I see some areas where we could improve the code structure and organization.",
        "Your code quality and organization look very strong.",
    );
    rating_line(
        analysis,
        "problem_solving",
        &mut parts,
        "Let's think about a more systematic approach to this problem.",
        "Your problem-solving approach is very methodical and well thought out.",
    );
    rating_line(
        analysis,
        "technical_skills",
        &mut parts,
        "I'd like to explore your experience with the technologies we're using here.",
        "Your technical skills are clearly demonstrated in this work.",
    );

    if let Some(recommendations) = analysis.get("recommendations").and_then(Value::as_array) {
        if let Some(first) = recommendations.first().and_then(Value::as_str) {
            parts.push(format!("Here are some suggestions: {}.", first));
        }
    }

    if parts.is_empty() {
        "This looks good. Can you walk me through your thought process?".to_string()
    } else {
        parts.join(" ")
    }
}

fn rating_line(analysis: &Value, field: &str, parts: &mut Vec<String>, low: &str, high: &str) {
    match analysis.get(field).and_then(Value::as_f64) {
        Some(rating) if rating < 4.0 => parts.push(low.to_string()),
        Some(rating) if rating > 7.0 => parts.push(high.to_string()),
        _ => {}
    }
}
