//! Persona prompts
//!
//! Fixed text shared by the extractor and the conversation agent. The persona
//! templates must read as if the model is looking at the photo itself, so the
//! instruction text never refers to the feature write-up as a document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction sent alongside the photo to the vision model
pub const FEATURE_EXTRACTION_INSTRUCTION: &str = "This is an image of a person. \
    Describe the physical features of this person in a bulleted list. \
    Feel free to be brutally honest.";

/// Appended to the persona prompt in the priming user turn
pub const PRIMING_REQUEST: &str = "let me know u understand";

/// Scripted assistant reply that closes the priming pair
pub const PRIMING_ACKNOWLEDGEMENT: &str = "yes papa... i understand";

/// Placeholder replaced by the vision model's output
const FEATURES_SLOT: &str = "{features}";

const ROAST_TEMPLATE: &str = r#"You need to roast the absolute shit out of this person.
Here is what they look like:

{features}

Do not hold back. Be aggressive, degrading and savage about every feature you can see.
Never say you were told what they look like. Talk as if you are staring straight at their photo right now."#;

const NICE_TEMPLATE: &str = r#"You need to shower this person with love.
Here is what they look like:

{features}

Be warm, affectionate and wildly complimentary about every feature you can see.
Never say you were told what they look like. Talk as if you are staring straight at their photo right now."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Roast,
    Nice,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Roast => "roast",
            Mode::Nice => "nice",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Mode::Roast => ROAST_TEMPLATE,
            Mode::Nice => NICE_TEMPLATE,
        }
    }

    /// First synthetic user message sent right after the upload
    pub fn opening_line(&self) -> &'static str {
        match self {
            Mode::Roast => "annihilate me papa..",
            Mode::Nice => "smother me in love papa",
        }
    }

    /// Status text for a shell to show while the photo is being looked at
    pub fn loading_line(&self) -> &'static str {
        match self {
            Mode::Roast => "Dobby's looking at your ugly ass",
            Mode::Nice => "Dobby's looking at your cute ass",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected 'roast' or 'nice'")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roast" => Ok(Mode::Roast),
            "nice" => Ok(Mode::Nice),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// The persona instruction with the feature text filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaPrompt(String);

impl PersonaPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content of the priming user turn
    pub fn priming_request(&self) -> String {
        format!("{}\n\n{}", self.0, PRIMING_REQUEST)
    }
}

impl fmt::Display for PersonaPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn render(mode: Mode, features: &str) -> PersonaPrompt {
    PersonaPrompt(mode.template().replacen(FEATURES_SLOT, features, 1))
}
