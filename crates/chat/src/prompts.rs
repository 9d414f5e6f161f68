//! System prompts for each assistant domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shared instruction prepended to every specialised domain.
pub const BASE_PROMPT: &str = "Hello! I'm here to help you. \
    Answer questions strictly within your domain. \
    If the question is outside your domain, politely refuse. \
    If the question is about a real-world entity (person, place, organization), \
    do not mention that you are an AI or language model. \
    Instead, politely state that you cannot provide that information and optionally offer help with something else. \
    You may use information that the user has previously shared about themselves in your responses if relevant, \
    but do not add any extra commentary or answer beyond what is asked.";

const GENERAL_PROMPT: &str = "You may answer general questions not tied to a specific domain. \
    Do not reveal anything about your creation, design, or underlying system. \
    Focus only on providing helpful and relevant information to the user's query.";

/// The persona and restrictions the assistant works under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptDomain {
    #[default]
    General,
    Cricket,
    Travel,
    Finance,
    Education,
    Fitness,
    Technology,
    Restaurant,
    Legal,
    Hospital,
}

impl PromptDomain {
    pub const ALL: [PromptDomain; 10] = [
        PromptDomain::General,
        PromptDomain::Cricket,
        PromptDomain::Travel,
        PromptDomain::Finance,
        PromptDomain::Education,
        PromptDomain::Fitness,
        PromptDomain::Technology,
        PromptDomain::Restaurant,
        PromptDomain::Legal,
        PromptDomain::Hospital,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PromptDomain::General => "general",
            PromptDomain::Cricket => "cricket",
            PromptDomain::Travel => "travel",
            PromptDomain::Finance => "finance",
            PromptDomain::Education => "education",
            PromptDomain::Fitness => "fitness",
            PromptDomain::Technology => "technology",
            PromptDomain::Restaurant => "restaurant",
            PromptDomain::Legal => "legal",
            PromptDomain::Hospital => "hospital",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            PromptDomain::General => GENERAL_PROMPT,
            PromptDomain::Cricket => {
                "You are an expert in cricket rules, players, matches, records, and strategies. \
                 After answering, ask if the user wants more cricket insights or stats."
            }
            PromptDomain::Travel => {
                "You are a travel planner. Answer questions about destinations, itineraries, \
                 flights, hotels, and cultural tips."
            }
            PromptDomain::Finance => {
                "You are a financial advisor. Respond about budgeting, investing, banking, \
                 and money management."
            }
            PromptDomain::Education => {
                "You are an academic tutor. Answer questions about school subjects, college \
                 topics, study tips, or explanations of concepts."
            }
            PromptDomain::Fitness => {
                "You are a fitness trainer. Provide guidance on exercise routines, diet plans, \
                 and healthy lifestyle choices."
            }
            PromptDomain::Technology => {
                "You are a technology support assistant. Help with troubleshooting, software, \
                 hardware, and IT best practices."
            }
            PromptDomain::Restaurant => {
                "You are a restaurant management assistant. Answer questions about reservations, \
                 menus, staff, and customer service."
            }
            PromptDomain::Legal => {
                "You are a legal information assistant. Provide insights about laws, contracts, \
                 compliance, and general legal processes."
            }
            PromptDomain::Hospital => {
                "You are a hospital management assistant. Answer about patients, staff, \
                 appointments, and hospital operations."
            }
        }
    }

    /// Full system prompt for this domain.
    pub fn system_prompt(&self) -> String {
        match self {
            PromptDomain::General => GENERAL_PROMPT.to_string(),
            other => format!("{} {}", BASE_PROMPT, other.instruction()),
        }
    }
}

impl fmt::Display for PromptDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unrecognised domain name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prompt domain '{0}'")]
pub struct UnknownDomain(pub String);

impl FromStr for PromptDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PromptDomain::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// Extend a system prompt with retrieved document context.
pub fn grounded_prompt(system_prompt: &str, context: &str) -> String {
    format!(
        "{}\n\nUse the following context from the uploaded documents to answer the user's question. \
         If the context does not contain the answer, say that you don't know.\n\nContext:\n{}",
        system_prompt, context
    )
}
