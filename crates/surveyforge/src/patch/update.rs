//! The update forest a PATCH submits.
//!
//! Every list is submitted in full: the position of an item is its new
//! `ord`, an item with `id: None` is created, an item with an id is
//! matched against the stored scope, and stored items left out of the
//! list are deleted. An absent list (`None`) deletes the whole scope.
//! Translations are the exception: they are key-addressed and absent
//! keys are left untouched.
//!
//! Image files are not part of these structures. They travel in
//! [`PatchUploads`]: a named slot for the config icon plus a flat
//! positional array consumed by the image-capable nodes in traversal
//! order (info cards, then pre-test form, post-test form, then groups;
//! within a form or test subtree, a node's own slot comes before its
//! children's).

use serde::{Deserialize, Serialize};

use crate::store::ImageUpload;

/// Root of one PATCH. General fields are always submitted in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub informed_consent: Option<String>,
    #[serde(default)]
    pub pattern: Option<PatternUpdate>,
    #[serde(default)]
    pub info_cards: Option<Vec<InfoCardUpdate>>,
    #[serde(default)]
    pub faqs: Option<Vec<FaqUpdate>>,
    #[serde(default)]
    pub pre_test_form: Option<FormUpdate>,
    #[serde(default)]
    pub post_test_form: Option<FormUpdate>,
    #[serde(default)]
    pub groups: Option<Vec<TestGroupUpdate>>,
    #[serde(default)]
    pub translations: Option<Vec<TranslationUpdate>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternUpdate {
    pub id: Option<i64>,
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoCardUpdate {
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// RGB color packed as 0xRRGGBB.
    pub color: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqUpdate {
    pub id: Option<i64>,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdate {
    #[serde(default)]
    pub title: Option<String>,
    pub questions: Vec<FormQuestionUpdate>,
}

/// One form question. The variant decides which fields are meaningful
/// and which child list the question carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum FormQuestionUpdate {
    SelectOne {
        id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        other: bool,
        options: Vec<FormOptionUpdate>,
    },
    SelectMultiple {
        id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
        #[serde(default)]
        other: bool,
        options: Vec<FormOptionUpdate>,
    },
    Slider {
        id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        text: Option<String>,
        min: i64,
        max: i64,
        step: i64,
        labels: Vec<SliderLabelUpdate>,
    },
    TextShort {
        id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        placeholder: Option<String>,
        #[serde(default)]
        min_length: Option<i64>,
        #[serde(default)]
        max_length: Option<i64>,
    },
    TextLong {
        id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        placeholder: Option<String>,
        #[serde(default)]
        min_length: Option<i64>,
        #[serde(default)]
        max_length: Option<i64>,
    },
}

impl FormQuestionUpdate {
    pub fn id(&self) -> Option<i64> {
        match self {
            FormQuestionUpdate::SelectOne { id, .. }
            | FormQuestionUpdate::SelectMultiple { id, .. }
            | FormQuestionUpdate::Slider { id, .. }
            | FormQuestionUpdate::TextShort { id, .. }
            | FormQuestionUpdate::TextLong { id, .. } => *id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            FormQuestionUpdate::SelectOne { .. } => "select-one",
            FormQuestionUpdate::SelectMultiple { .. } => "select-multiple",
            FormQuestionUpdate::Slider { .. } => "slider",
            FormQuestionUpdate::TextShort { .. } => "text-short",
            FormQuestionUpdate::TextLong { .. } => "text-long",
        }
    }

    /// Child option list for the select variants.
    pub fn options(&self) -> Option<&[FormOptionUpdate]> {
        match self {
            FormQuestionUpdate::SelectOne { options, .. }
            | FormQuestionUpdate::SelectMultiple { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Child label list for sliders.
    pub fn labels(&self) -> Option<&[SliderLabelUpdate]> {
        match self {
            FormQuestionUpdate::Slider { labels, .. } => Some(labels),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptionUpdate {
    pub id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderLabelUpdate {
    pub id: Option<i64>,
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestGroupUpdate {
    pub id: Option<i64>,
    pub label: String,
    /// Assignment probability in percent; must sum to 100 across groups.
    pub probability: i64,
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub allow_previous_phase: bool,
    #[serde(default)]
    pub allow_previous_question: bool,
    #[serde(default)]
    pub allow_skip_question: bool,
    #[serde(default)]
    pub randomize_phases: bool,
    pub phases: Vec<TestPhaseUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPhaseUpdate {
    pub id: Option<i64>,
    #[serde(default)]
    pub randomize_questions: bool,
    pub questions: Vec<TestQuestionUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestionUpdate {
    pub id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub randomize_options: bool,
    pub options: Vec<TestOptionUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOptionUpdate {
    pub id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUpdate {
    pub key: String,
    pub value: String,
}

/// Image files accompanying one PATCH.
#[derive(Debug, Default)]
pub struct PatchUploads {
    /// Named slot for the config icon (same grammar as the array slots).
    pub icon: Option<ImageUpload>,
    /// Flat positional slots for the image-capable nodes.
    pub slots: Vec<Option<ImageUpload>>,
}

/// Treats empty or whitespace-only optional text as absent.
pub fn normalize(value: Option<&str>) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => None,
    }
}
