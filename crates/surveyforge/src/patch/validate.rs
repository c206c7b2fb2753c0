//! Pre-reconciliation validation.
//!
//! Runs before the transaction opens and collects every field problem
//! in one pass, so a client gets the complete list instead of fixing
//! errors one at a time. A validation failure leaves both the database
//! and the disk untouched.

use regex::Regex;

use super::update::{ConfigUpdate, FormQuestionUpdate, FormUpdate, PatchUploads};
use crate::error::{FieldError, Result, SurveyError};
use crate::store::ImageStore;

const MAX_COLOR: i64 = 0xFF_FF_FF;

pub fn validate(update: &ConfigUpdate, uploads: &PatchUploads) -> Result<()> {
    let mut errors = Vec::new();

    if update.title.trim().is_empty() {
        errors.push(FieldError::new("title", "must not be empty"));
    }

    if let Some(pattern) = &update.pattern {
        if let Err(e) = Regex::new(&pattern.regex) {
            errors.push(FieldError::new("pattern.regex", format!("does not compile: {e}")));
        }
    }

    if let Some(cards) = &update.info_cards {
        for (i, card) in cards.iter().enumerate() {
            if card.title.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("infoCards[{i}].title"),
                    "must not be empty",
                ));
            }
            if !(0..=MAX_COLOR).contains(&card.color) {
                errors.push(FieldError::new(
                    format!("infoCards[{i}].color"),
                    "must be a packed RGB value in 0..=0xFFFFFF",
                ));
            }
        }
    }

    if let Some(form) = &update.pre_test_form {
        validate_form(form, "preTestForm", &mut errors);
    }
    if let Some(form) = &update.post_test_form {
        validate_form(form, "postTestForm", &mut errors);
    }

    if let Some(groups) = &update.groups {
        let mut sum = 0i64;
        for (i, group) in groups.iter().enumerate() {
            if !(0..=100).contains(&group.probability) {
                errors.push(FieldError::new(
                    format!("groups[{i}].probability"),
                    "must be between 0 and 100",
                ));
            }
            sum += group.probability;
        }
        if !groups.is_empty() && sum != 100 {
            errors.push(FieldError::new(
                "groups",
                format!("probabilities must sum to 100, got {sum}"),
            ));
        }
    }

    if let Some(icon) = &uploads.icon {
        if !icon.bytes.is_empty() {
            if let Err(e) = ImageStore::validate(icon) {
                errors.push(FieldError::new("icon", e.to_string()));
            }
        }
    }
    for (i, slot) in uploads.slots.iter().enumerate() {
        if let Some(upload) = slot {
            if !upload.bytes.is_empty() {
                if let Err(e) = ImageStore::validate(upload) {
                    errors.push(FieldError::new(format!("uploads[{i}]"), e.to_string()));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SurveyError::Validation(errors))
    }
}

fn validate_form(form: &FormUpdate, field: &str, errors: &mut Vec<FieldError>) {
    for (i, question) in form.questions.iter().enumerate() {
        match question {
            FormQuestionUpdate::Slider { min, max, step, .. } => {
                if min >= max {
                    errors.push(FieldError::new(
                        format!("{field}.questions[{i}]"),
                        "slider min must be less than max",
                    ));
                }
                if *step < 1 {
                    errors.push(FieldError::new(
                        format!("{field}.questions[{i}].step"),
                        "must be at least 1",
                    ));
                }
            }
            FormQuestionUpdate::TextShort {
                min_length,
                max_length,
                ..
            }
            | FormQuestionUpdate::TextLong {
                min_length,
                max_length,
                ..
            } => {
                if let (Some(min), Some(max)) = (min_length, max_length) {
                    if min > max {
                        errors.push(FieldError::new(
                            format!("{field}.questions[{i}]"),
                            "minLength must not exceed maxLength",
                        ));
                    }
                }
                if matches!(min_length, Some(n) if *n < 0)
                    || matches!(max_length, Some(n) if *n < 0)
                {
                    errors.push(FieldError::new(
                        format!("{field}.questions[{i}]"),
                        "length bounds must not be negative",
                    ));
                }
            }
            FormQuestionUpdate::SelectMultiple { min, max, .. } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        errors.push(FieldError::new(
                            format!("{field}.questions[{i}]"),
                            "min selections must not exceed max",
                        ));
                    }
                }
            }
            FormQuestionUpdate::SelectOne { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::update::{InfoCardUpdate, PatternUpdate, TestGroupUpdate};
    use crate::store::ImageUpload;

    fn base_update() -> ConfigUpdate {
        serde_json::from_str(r#"{"title": "Study"}"#).unwrap()
    }

    fn field_names(err: SurveyError) -> Vec<String> {
        match err {
            SurveyError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_collects_all_errors_at_once() {
        let mut update = base_update();
        update.title = "  ".into();
        update.pattern = Some(PatternUpdate {
            id: None,
            name: "p".into(),
            regex: "[".into(),
        });
        update.info_cards = Some(vec![InfoCardUpdate {
            id: None,
            title: "c".into(),
            description: None,
            color: -1,
        }]);

        let err = validate(&update, &PatchUploads::default()).unwrap_err();
        let fields = field_names(err);
        assert_eq!(fields, ["title", "pattern.regex", "infoCards[0].color"]);
    }

    #[test]
    fn test_probability_sum_must_be_100() {
        let mut update = base_update();
        let group = |p: i64| TestGroupUpdate {
            id: None,
            label: "g".into(),
            probability: p,
            greeting: None,
            allow_previous_phase: false,
            allow_previous_question: false,
            allow_skip_question: false,
            randomize_phases: false,
            phases: vec![],
        };
        update.groups = Some(vec![group(60), group(60)]);

        let err = validate(&update, &PatchUploads::default()).unwrap_err();
        assert_eq!(field_names(err), ["groups"]);

        update.groups = Some(vec![group(60), group(40)]);
        validate(&update, &PatchUploads::default()).unwrap();
    }

    #[test]
    fn test_invalid_upload_bytes_are_reported() {
        let uploads = PatchUploads {
            icon: None,
            slots: vec![
                None,
                Some(ImageUpload {
                    bytes: vec![0, 1, 2],
                    alt: None,
                }),
                // Empty bytes mean "clear", not an upload.
                Some(ImageUpload {
                    bytes: vec![],
                    alt: None,
                }),
            ],
        };
        let err = validate(&base_update(), &uploads).unwrap_err();
        assert_eq!(field_names(err), ["uploads[1]"]);
    }

    #[test]
    fn test_slider_bounds() {
        let mut update = base_update();
        update.pre_test_form = Some(
            serde_json::from_str(
                r#"{
                    "questions": [
                        {"type": "slider", "id": null, "min": 5, "max": 5, "step": 0, "labels": []}
                    ]
                }"#,
            )
            .unwrap(),
        );
        let err = validate(&update, &PatchUploads::default()).unwrap_err();
        assert_eq!(
            field_names(err),
            ["preTestForm.questions[0]", "preTestForm.questions[0].step"]
        );
    }
}
