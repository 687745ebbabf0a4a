//! Payloads of the guess sheet and guess mutation routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::persistence::SaveOutcome,
    dto::validation::{validate_member_name, validate_not_blank},
    state::{guess_rules::Selection, week::WeekKey},
};

/// Add or remove one "this person submitted that album" pick.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GuessRequest {
    #[validate(custom(function = "validate_member_name"))]
    pub guesser: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub album_key: String,
    #[validate(custom(function = "validate_member_name"))]
    pub guessed_submitter: String,
    /// Week in `DD/MM/YYYY` form; the current week when omitted.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "05/01/2024")]
    pub week: Option<WeekKey>,
}

/// One pick inside a finalize request.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectionInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub album_key: String,
    #[validate(custom(function = "validate_member_name"))]
    pub guessed_submitter: String,
}

impl From<SelectionInput> for Selection {
    fn from(value: SelectionInput) -> Self {
        Selection::new(value.album_key, value.guessed_submitter.trim())
    }
}

/// Complete set of picks that replaces the guesser's rows before locking them.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FinalizeRequest {
    #[validate(custom(function = "validate_member_name"))]
    pub guesser: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "05/01/2024")]
    pub week: Option<WeekKey>,
    #[validate(nested)]
    pub selections: Vec<SelectionInput>,
}

/// Query of the guess sheet route.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SheetQuery {
    /// Member filling in the sheet.
    pub guesser: String,
    /// Week in `DD/MM/YYYY` form; the current week when omitted.
    #[param(value_type = Option<String>)]
    pub week: Option<WeekKey>,
}

/// Lock status of one guesser for a week.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizedResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    pub guesser: String,
    pub finalized: bool,
}

/// Outcome of a guess mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GuessChangeResponse {
    /// Whether the stored rows changed. Repeated or absent picks leave them untouched.
    pub changed: bool,
    /// Whether the change reached the shared store.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GuessChangeResponse {
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            success: true,
            error: None,
        }
    }

    pub fn saved(outcome: SaveOutcome) -> Self {
        Self {
            changed: true,
            success: outcome.success,
            error: outcome.error,
        }
    }
}

/// Album as shown on the guess sheet, without revealing its submitters.
#[derive(Debug, Serialize, ToSchema)]
pub struct SheetAlbum {
    pub album_key: String,
    pub artist: String,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// People the guesser currently picked for this album.
    pub selections: Vec<String>,
}

/// Everything a client needs to render the guess form of one member.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessSheetResponse {
    #[schema(value_type = String, example = "05/01/2024")]
    pub week: WeekKey,
    pub guesser: String,
    /// Albums of the week in random order.
    pub albums: Vec<SheetAlbum>,
    /// People who submitted something this week.
    pub candidates: Vec<String>,
    /// Most picks allowed on a single album.
    pub max_duplicate_count: usize,
    pub has_duplicates: bool,
    pub finalized: bool,
    /// Whether the guesser submitted an album this week.
    pub has_submitted: bool,
    pub max_selections_per_person: usize,
}
