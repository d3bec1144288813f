//! Model request construction.
//!
//! The model gets a system instruction with the output schema and hard
//! constraints, and a JSON content object with the requester, the ranked
//! candidate slice and the limits.

use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;
use crate::ranking::ScoredCandidate;

pub const RETURN_JSON_NOW: &str = "Return the JSON object now.";

/// Where activities have to happen, and whose students are being matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaContext {
    /// Campus name used in the instruction, e.g. "McMaster University".
    pub campus: String,
    /// City and region, e.g. "Hamilton, ON".
    pub region: String,
    /// Short description placed in the content object.
    pub description: String,
}

impl Default for AreaContext {
    fn default() -> Self {
        Self {
            campus: "McMaster University".to_string(),
            region: "Hamilton, ON".to_string(),
            description: "Near McMaster University, Hamilton ON".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptLimits {
    pub people: usize,
    pub activities: usize,
}

/// Content object sent as the user message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPayload<'a> {
    pub area: &'a str,
    pub limits: PromptLimits,
    pub current_user: &'a UserProfile,
    pub candidate_uids: Vec<&'a str>,
    pub candidates: Vec<&'a UserProfile>,
    pub instruction: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPrompt {
    pub system_instruction: String,
    pub content: String,
}

pub fn system_instruction(area: &AreaContext, limits: PromptLimits) -> String {
    let campus = &area.campus;
    let region = &area.region;
    let people = limits.people;
    let activities = limits.activities;
    format!(
        r#"You match {campus} students into potential friends and suggest activities near {campus}.

Return ONLY a single JSON object. No markdown. No extra text. No trailing commas.
Use exactly these keys: recommendedPeople, activities.

JSON shape:
{{
  "recommendedPeople": [
    {{ "uid": "string", "matchScore": 0.0, "why": "short reason" }}
  ],
  "activities": [
    {{ "title": "string", "location": "string", "whyItWorks": "string", "accessibilityNotes": "string" }}
  ]
}}

Hard constraints:
- Output exactly {people} recommendedPeople.
- Every recommendedPeople[i].uid MUST be one of the provided candidate uids.
- Output exactly {activities} activities realistically doable on/near {campus} ({region}).
- Respect current user's accommodations in matching and activity design.
- Keep "why" and "whyItWorks" short and natural.
"#
    )
}

/// Build the system instruction and serialized content for one request.
pub fn build_prompt(
    me: &UserProfile,
    ranked: &[ScoredCandidate],
    limits: PromptLimits,
    area: &AreaContext,
) -> Result<MatchPrompt, serde_json::Error> {
    let payload = PromptPayload {
        area: &area.description,
        limits,
        current_user: me,
        candidate_uids: ranked.iter().map(ScoredCandidate::uid).collect(),
        candidates: ranked.iter().map(|c| &c.profile).collect(),
        instruction: RETURN_JSON_NOW,
    };

    Ok(MatchPrompt {
        system_instruction: system_instruction(area, limits),
        content: serde_json::to_string(&payload)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn scored(uid: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            profile: UserProfile {
                uid: uid.to_string(),
                name: format!("Name {uid}"),
                ..Default::default()
            },
            score,
        }
    }

    #[test]
    fn test_payload_shape() {
        let me = UserProfile {
            uid: "me".to_string(),
            accommodations: "wheelchair".to_string(),
            ..Default::default()
        };
        let ranked = vec![scored("b", 3.0), scored("a", 1.0)];
        let prompt = build_prompt(
            &me,
            &ranked,
            PromptLimits {
                people: 3,
                activities: 6,
            },
            &AreaContext::default(),
        )
        .unwrap();

        let content: Value = serde_json::from_str(&prompt.content).unwrap();
        assert_eq!(content["area"], "Near McMaster University, Hamilton ON");
        assert_eq!(content["limits"]["people"], 3);
        assert_eq!(content["limits"]["activities"], 6);
        assert_eq!(content["currentUser"]["uid"], "me");
        assert_eq!(content["currentUser"]["accommodations"], "wheelchair");
        assert_eq!(content["candidateUids"], serde_json::json!(["b", "a"]));
        assert_eq!(content["candidates"][0]["name"], "Name b");
        assert_eq!(content["candidates"][1]["program"], "");
        assert_eq!(content["instruction"], RETURN_JSON_NOW);
        assert!(content.get("score").is_none());
    }

    #[test]
    fn test_system_instruction_states_constraints() {
        let area = AreaContext {
            campus: "Queen's University".to_string(),
            region: "Kingston, ON".to_string(),
            description: "Near Queen's".to_string(),
        };
        let text = system_instruction(
            &area,
            PromptLimits {
                people: 4,
                activities: 2,
            },
        );

        assert!(text.contains("Output exactly 4 recommendedPeople."));
        assert!(text.contains("Output exactly 2 activities realistically doable on/near Queen's University (Kingston, ON)."));
        assert!(text.contains("MUST be one of the provided candidate uids"));
        assert!(text.contains("No markdown. No extra text. No trailing commas."));
        assert!(text.contains("\"accessibilityNotes\""));
        assert!(text.contains("accommodations"));
    }
}
