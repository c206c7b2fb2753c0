//! Pre/post-test form section: the form singleton, its questions, the
//! options of select questions and the labels of slider questions.
//!
//! A question's variant decides which child list it carries; switching
//! a stored question to a different variant reconciles the now
//! inapplicable child lists against `None`, deleting the stray rows.

use super::{collect_orphan, resolve_image};
use crate::db::form_repo::{self, FormKind, FormOptionRow, FormQuestionRow, SliderLabelRow};
use crate::error::{Result, SurveyError};
use crate::patch::cursor::SlotValue;
use crate::patch::reconcile::{reconcile, PatchCtx, SectionAdapter};
use crate::patch::update::{
    normalize, FormOptionUpdate, FormQuestionUpdate, FormUpdate, SliderLabelUpdate,
};
use crate::store::ImageCategory;

/// Reconciles one of the two per-version forms. `None` deletes the
/// form, its questions and their images.
pub fn reconcile_form(
    ctx: &mut PatchCtx<'_>,
    version: i64,
    kind: FormKind,
    update: Option<&FormUpdate>,
) -> Result<bool> {
    let stored = form_repo::find_form(ctx.conn, version, kind)?;

    let Some(update) = update else {
        let Some(form) = stored else {
            return Ok(false);
        };
        // Children first so their images get collected.
        reconcile(&FormQuestionAdapter { form_id: form.id }, ctx, None)?;
        form_repo::delete_form(ctx.conn, form.id)?;
        return Ok(true);
    };

    let mut changed = false;
    let title = normalize(update.title.as_deref());
    let form_id = match stored {
        Some(form) => {
            if form.title != title {
                form_repo::update_form_title(ctx.conn, form.id, title.as_deref())?;
                changed = true;
            }
            form.id
        }
        None => {
            changed = true;
            form_repo::insert_form(ctx.conn, version, kind, title.as_deref())?
        }
    };

    let questions = reconcile(
        &FormQuestionAdapter { form_id },
        ctx,
        Some(&update.questions),
    )?;
    Ok(changed || questions)
}

pub struct FormQuestionAdapter {
    pub form_id: i64,
}

impl FormQuestionAdapter {
    fn desired_row(
        &self,
        update: &FormQuestionUpdate,
        id: i64,
        ord: i64,
        image_id: Option<i64>,
    ) -> FormQuestionRow {
        let mut row = FormQuestionRow {
            id,
            form_id: self.form_id,
            ord,
            kind: update.kind_str().to_string(),
            category: None,
            text: None,
            image_id,
            min: None,
            max: None,
            step: None,
            min_length: None,
            max_length: None,
            placeholder: None,
            other: false,
        };

        match update {
            FormQuestionUpdate::SelectOne {
                category,
                text,
                other,
                ..
            } => {
                row.category = normalize(category.as_deref());
                row.text = normalize(text.as_deref());
                row.other = *other;
            }
            FormQuestionUpdate::SelectMultiple {
                category,
                text,
                min,
                max,
                other,
                ..
            } => {
                row.category = normalize(category.as_deref());
                row.text = normalize(text.as_deref());
                row.min = *min;
                row.max = *max;
                row.other = *other;
            }
            FormQuestionUpdate::Slider {
                category,
                text,
                min,
                max,
                step,
                ..
            } => {
                row.category = normalize(category.as_deref());
                row.text = normalize(text.as_deref());
                row.min = Some(*min);
                row.max = Some(*max);
                row.step = Some(*step);
            }
            FormQuestionUpdate::TextShort {
                category,
                text,
                placeholder,
                min_length,
                max_length,
                ..
            }
            | FormQuestionUpdate::TextLong {
                category,
                text,
                placeholder,
                min_length,
                max_length,
                ..
            } => {
                row.category = normalize(category.as_deref());
                row.text = normalize(text.as_deref());
                row.placeholder = normalize(placeholder.as_deref());
                row.min_length = *min_length;
                row.max_length = *max_length;
            }
        }
        row
    }
}

impl SectionAdapter for FormQuestionAdapter {
    type Update = FormQuestionUpdate;

    fn label(&self) -> &'static str {
        "form question"
    }

    fn update_id(update: &FormQuestionUpdate) -> Option<i64> {
        update.id()
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let questions = form_repo::find_questions(ctx.conn, self.form_id)?;
        Ok(questions.into_iter().map(|q| q.id).collect())
    }

    fn image_capable(&self) -> bool {
        true
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &FormQuestionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64> {
        let change = resolve_image(ctx, None, slot, ImageCategory::FormQuestion)?;
        let row = self.desired_row(update, 0, ord, change.image_id);
        let id = form_repo::insert_question(ctx.conn, &row)?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &FormQuestionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool> {
        let stored = form_repo::find_question(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("form question {id}")))?;
        let change = resolve_image(ctx, stored.image_id, slot, ImageCategory::FormQuestion)?;

        let desired = self.desired_row(update, id, ord, change.image_id);
        let row_changed = desired != stored;
        if row_changed {
            form_repo::update_question(ctx.conn, &desired)?;
        }
        collect_orphan(ctx, change.orphan)?;
        Ok(row_changed || change.changed)
    }

    fn recurse(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &FormQuestionUpdate,
    ) -> Result<bool> {
        let options = reconcile(
            &FormOptionAdapter { question_id: id },
            ctx,
            update.options(),
        )?;
        let labels = reconcile(
            &SliderLabelAdapter { question_id: id },
            ctx,
            update.labels(),
        )?;
        Ok(options || labels)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        reconcile(&FormOptionAdapter { question_id: id }, ctx, None)?;
        reconcile(&SliderLabelAdapter { question_id: id }, ctx, None)?;

        let stored = form_repo::find_question(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("form question {id}")))?;
        form_repo::delete_question(ctx.conn, id)?;
        collect_orphan(ctx, stored.image_id)?;
        Ok(())
    }
}

pub struct FormOptionAdapter {
    pub question_id: i64,
}

impl SectionAdapter for FormOptionAdapter {
    type Update = FormOptionUpdate;

    fn label(&self) -> &'static str {
        "form option"
    }

    fn update_id(update: &FormOptionUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let options = form_repo::find_options(ctx.conn, self.question_id)?;
        Ok(options.into_iter().map(|o| o.id).collect())
    }

    fn image_capable(&self) -> bool {
        true
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &FormOptionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64> {
        let change = resolve_image(ctx, None, slot, ImageCategory::FormOption)?;
        let id = form_repo::insert_option(
            ctx.conn,
            &FormOptionRow {
                id: 0,
                question_id: self.question_id,
                ord,
                text: normalize(update.text.as_deref()),
                image_id: change.image_id,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &FormOptionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool> {
        let stored = form_repo::find_option(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("form option {id}")))?;
        let change = resolve_image(ctx, stored.image_id, slot, ImageCategory::FormOption)?;

        let desired = FormOptionRow {
            id,
            question_id: stored.question_id,
            ord,
            text: normalize(update.text.as_deref()),
            image_id: change.image_id,
        };

        let row_changed = desired != stored;
        if row_changed {
            form_repo::update_option(ctx.conn, &desired)?;
        }
        collect_orphan(ctx, change.orphan)?;
        Ok(row_changed || change.changed)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        let stored = form_repo::find_option(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("form option {id}")))?;
        form_repo::delete_option(ctx.conn, id)?;
        collect_orphan(ctx, stored.image_id)?;
        Ok(())
    }
}

/// Slider labels are keyed by id like any other child list, but carry
/// no `ord` column: their position is the slider value itself.
pub struct SliderLabelAdapter {
    pub question_id: i64,
}

impl SectionAdapter for SliderLabelAdapter {
    type Update = SliderLabelUpdate;

    fn label(&self) -> &'static str {
        "slider label"
    }

    fn update_id(update: &SliderLabelUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let labels = form_repo::find_slider_labels(ctx.conn, self.question_id)?;
        Ok(labels.into_iter().map(|l| l.id).collect())
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &SliderLabelUpdate,
        _ord: i64,
        _slot: SlotValue,
    ) -> Result<i64> {
        let id = form_repo::insert_slider_label(
            ctx.conn,
            &SliderLabelRow {
                id: 0,
                question_id: self.question_id,
                value: update.value,
                label: update.label.clone(),
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &SliderLabelUpdate,
        _ord: i64,
        _slot: SlotValue,
    ) -> Result<bool> {
        let stored = form_repo::find_slider_labels(ctx.conn, self.question_id)?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| SurveyError::NotFound(format!("slider label {id}")))?;

        let desired = SliderLabelRow {
            id,
            question_id: stored.question_id,
            value: update.value,
            label: update.label.clone(),
        };

        if desired != stored {
            form_repo::update_slider_label(ctx.conn, &desired)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        form_repo::delete_slider_label(ctx.conn, id)?;
        Ok(())
    }
}
