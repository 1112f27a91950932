//! Text-generation backed suggestions and coaching.
//!
//! Callers never see a generation failure: every [`SuggestionClient`]
//! method logs the cause and returns a canned answer instead.

pub mod gemini;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::model::{AnnualPlan, WeeklyWin};
pub use gemini::GeminiGenerator;

/// Weekly reviews included as coaching context, newest first.
const COACH_HISTORY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Ask for a JSON object with `title` and `description`.
    pub structured: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("no API key: set ${0}")]
    MissingApiKey(String),

    #[error("generation service returned HTTP {0}")]
    Status(u16),

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generation response had no text")]
    EmptyResponse,

    #[error("could not decode generation response: {0}")]
    Decode(String),
}

/// Seam between the planner and a text-generation backend.
pub trait TextGenerator {
    /// Produce text for `req`.
    ///
    /// # Errors
    ///
    /// Any transport, authentication, or response-shape failure.
    fn generate(&self, req: &GenerationRequest) -> Result<String, SuggestError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, req: &GenerationRequest) -> Result<String, SuggestError> {
        (**self).generate(req)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    /// True when this is the canned answer rather than generated text.
    #[serde(default)]
    pub fallback: bool,
}

impl Suggestion {
    fn canned(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            fallback: true,
        }
    }
}

#[must_use]
pub fn fallback_anchor() -> Suggestion {
    Suggestion::canned(
        "50-Mile Ultra Marathon",
        "Ten-plus hours on your feet with a real chance of not finishing. \
         That coin-flip odds is exactly the point.",
    )
}

#[must_use]
pub fn fallback_milestone() -> Suggestion {
    Suggestion::canned(
        "Weekend Off-Grid Trek",
        "Two days, one pack, no signal. Book it now and let the rest of the \
         calendar work around it.",
    )
}

pub const FALLBACK_ADVICE: &str = "Your coach is out on the trail with no signal. \
     Stop bargaining with your goals, get outside in the morning light, and \
     add something worth remembering to the calendar today.";

/// Parse a generated `{title, description}` object.
///
/// Tolerates surrounding whitespace and a Markdown code fence.
///
/// # Errors
///
/// [`SuggestError::Decode`] if the text is not such an object or the title
/// is blank.
pub fn parse_suggestion(raw: &str) -> Result<Suggestion, SuggestError> {
    #[derive(Deserialize)]
    struct Generated {
        title: String,
        #[serde(default)]
        description: String,
    }

    let body = strip_fence(raw.trim());
    let generated: Generated =
        serde_json::from_str(body).map_err(|e| SuggestError::Decode(e.to_string()))?;
    let title = generated.title.trim();
    if title.is_empty() {
        return Err(SuggestError::Decode("empty title".into()));
    }
    Ok(Suggestion {
        title: title.to_string(),
        description: generated.description.trim().to_string(),
        fallback: false,
    })
}

fn strip_fence(body: &str) -> &str {
    body.strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(body, |inner| {
            inner
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .trim()
        })
}

fn anchor_prompt(interest: &str, theme: &str) -> String {
    format!(
        "Someone planning a year themed \"{theme}\" is interested in: {interest}.\n\
         Propose ONE defining challenge for their year. It should be hard enough \
         that they have roughly even odds of failing, and memorable enough to \
         tell stories about for decades.\n\
         Answer as a JSON object with string fields \"title\" and \"description\"."
    )
}

fn milestone_prompt(interest: &str, theme: &str) -> String {
    format!(
        "Someone planning a year themed \"{theme}\" is interested in: {interest}.\n\
         Propose ONE experience they could put on the calendar in the next two \
         months: a trip, event, or adventure that breaks routine.\n\
         Answer as a JSON object with string fields \"title\" and \"description\"."
    )
}

fn coach_prompt(plan: &AnnualPlan, wins: &[WeeklyWin], query: &str) -> String {
    let recent: Vec<&WeeklyWin> = wins.iter().take(COACH_HISTORY).collect();
    let context = json!({ "plan": plan, "recentWeeks": recent });
    format!(
        "You are a blunt, high-energy life coach. Your principles: pick one \
         year-defining challenge with even odds of failure; win every week in \
         health, wealth, relationships, and self; book a memorable experience \
         every eight weeks; schedule life before work; own the first hour of \
         each morning.\n\
         If the person is slacking, say so. If they are winning, push harder. \
         Keep it short.\n\n\
         CONTEXT:\n{context}\n\nQUESTION: {query}"
    )
}

/// Suggestion and coaching front-end over a [`TextGenerator`].
#[derive(Debug, Clone)]
pub struct SuggestionClient<G> {
    generator: G,
}

impl<G: TextGenerator> SuggestionClient<G> {
    pub const fn new(generator: G) -> Self {
        Self { generator }
    }

    fn structured(&self, prompt: String, kind: &str, fallback: fn() -> Suggestion) -> Suggestion {
        let req = GenerationRequest {
            prompt,
            structured: true,
        };
        match self
            .generator
            .generate(&req)
            .and_then(|raw| parse_suggestion(&raw))
        {
            Ok(suggestion) => {
                debug!(kind, title = %suggestion.title, "generated suggestion");
                suggestion
            }
            Err(err) => {
                warn!(kind, error = %err, "suggestion failed, using fallback");
                fallback()
            }
        }
    }

    /// Propose an anchor goal for someone with `interest`.
    pub fn suggest_anchor(&self, interest: &str, theme: &str) -> Suggestion {
        self.structured(anchor_prompt(interest, theme), "anchor", fallback_anchor)
    }

    /// Propose a milestone experience for someone with `interest`.
    pub fn suggest_milestone(&self, interest: &str, theme: &str) -> Suggestion {
        self.structured(
            milestone_prompt(interest, theme),
            "milestone",
            fallback_milestone,
        )
    }

    /// Free-text advice about `query` given the plan and recent weeks.
    pub fn coach(&self, plan: &AnnualPlan, wins: &[WeeklyWin], query: &str) -> String {
        let req = GenerationRequest {
            prompt: coach_prompt(plan, wins, query),
            structured: false,
        };
        match self.generator.generate(&req) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(error = %SuggestError::EmptyResponse, "coaching failed, using fallback");
                FALLBACK_ADVICE.to_string()
            }
            Err(err) => {
                warn!(error = %err, "coaching failed, using fallback");
                FALLBACK_ADVICE.to_string()
            }
        }
    }
}
