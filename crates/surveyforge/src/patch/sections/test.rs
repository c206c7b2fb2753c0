//! Test section: groups, phases, questions, options.
//!
//! This is the guarded family: stored nodes referenced by attempt or
//! answer logs cannot be deleted. The guard runs at the level being
//! deleted; the deep delete below it does not re-check descendants,
//! because log rows can only reference nodes under a group that itself
//! passed the guard.

use super::{collect_orphan, resolve_image};
use crate::db::test_repo::{self, TestGroupRow, TestOptionRow, TestPhaseRow, TestQuestionRow};
use crate::error::{Result, SurveyError};
use crate::patch::cursor::SlotValue;
use crate::patch::guard;
use crate::patch::reconcile::{reconcile, PatchCtx, SectionAdapter};
use crate::patch::update::{
    normalize, TestGroupUpdate, TestOptionUpdate, TestPhaseUpdate, TestQuestionUpdate,
};
use crate::store::ImageCategory;

pub struct TestGroupAdapter {
    pub version: i64,
}

impl SectionAdapter for TestGroupAdapter {
    type Update = TestGroupUpdate;

    fn label(&self) -> &'static str {
        "group"
    }

    fn update_id(update: &TestGroupUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let groups = test_repo::find_groups(ctx.conn, self.version)?;
        Ok(groups.into_iter().map(|g| g.id).collect())
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &TestGroupUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<i64> {
        let id = test_repo::insert_group(
            ctx.conn,
            &TestGroupRow {
                id: 0,
                config_version: self.version,
                ord,
                label: update.label.clone(),
                probability: update.probability,
                greeting: normalize(update.greeting.as_deref()),
                allow_previous_phase: update.allow_previous_phase,
                allow_previous_question: update.allow_previous_question,
                allow_skip_question: update.allow_skip_question,
                randomize_phases: update.randomize_phases,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &TestGroupUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<bool> {
        let stored = test_repo::find_group(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("group {id}")))?;

        let desired = TestGroupRow {
            id,
            config_version: stored.config_version,
            ord,
            label: update.label.clone(),
            probability: update.probability,
            greeting: normalize(update.greeting.as_deref()),
            allow_previous_phase: update.allow_previous_phase,
            allow_previous_question: update.allow_previous_question,
            allow_skip_question: update.allow_skip_question,
            randomize_phases: update.randomize_phases,
        };

        if desired != stored {
            test_repo::update_group(ctx.conn, &desired)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn recurse(&self, ctx: &mut PatchCtx<'_>, id: i64, update: &TestGroupUpdate) -> Result<bool> {
        reconcile(&TestPhaseAdapter { group_id: id }, ctx, Some(&update.phases))
    }

    fn guard_delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        guard::ensure_group_deletable(ctx.conn, id)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        for phase in test_repo::find_phases(ctx.conn, id)? {
            delete_phase_deep(ctx, phase.id)?;
        }
        test_repo::delete_group(ctx.conn, id)?;
        Ok(())
    }
}

pub struct TestPhaseAdapter {
    pub group_id: i64,
}

impl SectionAdapter for TestPhaseAdapter {
    type Update = TestPhaseUpdate;

    fn label(&self) -> &'static str {
        "phase"
    }

    fn update_id(update: &TestPhaseUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let phases = test_repo::find_phases(ctx.conn, self.group_id)?;
        Ok(phases.into_iter().map(|p| p.id).collect())
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &TestPhaseUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<i64> {
        let id = test_repo::insert_phase(
            ctx.conn,
            &TestPhaseRow {
                id: 0,
                group_id: self.group_id,
                ord,
                randomize_questions: update.randomize_questions,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &TestPhaseUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<bool> {
        let stored = test_repo::find_phase(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("phase {id}")))?;

        let desired = TestPhaseRow {
            id,
            group_id: stored.group_id,
            ord,
            randomize_questions: update.randomize_questions,
        };

        if desired != stored {
            test_repo::update_phase(ctx.conn, &desired)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn recurse(&self, ctx: &mut PatchCtx<'_>, id: i64, update: &TestPhaseUpdate) -> Result<bool> {
        reconcile(
            &TestQuestionAdapter { phase_id: id },
            ctx,
            Some(&update.questions),
        )
    }

    fn guard_delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        guard::ensure_phase_deletable(ctx.conn, id)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        delete_phase_deep(ctx, id)
    }
}

pub struct TestQuestionAdapter {
    pub phase_id: i64,
}

impl SectionAdapter for TestQuestionAdapter {
    type Update = TestQuestionUpdate;

    fn label(&self) -> &'static str {
        "test question"
    }

    fn update_id(update: &TestQuestionUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let questions = test_repo::find_questions(ctx.conn, self.phase_id)?;
        Ok(questions.into_iter().map(|q| q.id).collect())
    }

    fn image_capable(&self) -> bool {
        true
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &TestQuestionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64> {
        let change = resolve_image(ctx, None, slot, ImageCategory::TestQuestion)?;
        let id = test_repo::insert_question(
            ctx.conn,
            &TestQuestionRow {
                id: 0,
                phase_id: self.phase_id,
                ord,
                text: normalize(update.text.as_deref()),
                image_id: change.image_id,
                randomize_options: update.randomize_options,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &TestQuestionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool> {
        let stored = test_repo::find_question(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("test question {id}")))?;
        let change = resolve_image(ctx, stored.image_id, slot, ImageCategory::TestQuestion)?;

        let desired = TestQuestionRow {
            id,
            phase_id: stored.phase_id,
            ord,
            text: normalize(update.text.as_deref()),
            image_id: change.image_id,
            randomize_options: update.randomize_options,
        };

        let row_changed = desired != stored;
        if row_changed {
            test_repo::update_question(ctx.conn, &desired)?;
        }
        collect_orphan(ctx, change.orphan)?;
        Ok(row_changed || change.changed)
    }

    fn recurse(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &TestQuestionUpdate,
    ) -> Result<bool> {
        reconcile(
            &TestOptionAdapter { question_id: id },
            ctx,
            Some(&update.options),
        )
    }

    fn guard_delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        guard::ensure_question_deletable(ctx.conn, id)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        delete_question_deep(ctx, id)
    }
}

pub struct TestOptionAdapter {
    pub question_id: i64,
}

impl SectionAdapter for TestOptionAdapter {
    type Update = TestOptionUpdate;

    fn label(&self) -> &'static str {
        "test option"
    }

    fn update_id(update: &TestOptionUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let options = test_repo::find_options(ctx.conn, self.question_id)?;
        Ok(options.into_iter().map(|o| o.id).collect())
    }

    fn image_capable(&self) -> bool {
        true
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &TestOptionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64> {
        let change = resolve_image(ctx, None, slot, ImageCategory::TestOption)?;
        let id = test_repo::insert_option(
            ctx.conn,
            &TestOptionRow {
                id: 0,
                question_id: self.question_id,
                ord,
                text: normalize(update.text.as_deref()),
                correct: update.correct,
                image_id: change.image_id,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &TestOptionUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool> {
        let stored = test_repo::find_option(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("test option {id}")))?;
        let change = resolve_image(ctx, stored.image_id, slot, ImageCategory::TestOption)?;

        let desired = TestOptionRow {
            id,
            question_id: stored.question_id,
            ord,
            text: normalize(update.text.as_deref()),
            correct: update.correct,
            image_id: change.image_id,
        };

        let row_changed = desired != stored;
        if row_changed {
            test_repo::update_option(ctx.conn, &desired)?;
        }
        collect_orphan(ctx, change.orphan)?;
        Ok(row_changed || change.changed)
    }

    fn guard_delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        guard::ensure_option_deletable(ctx.conn, id)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        delete_option_deep(ctx, id)
    }
}

fn delete_phase_deep(ctx: &mut PatchCtx<'_>, phase_id: i64) -> Result<()> {
    for question in test_repo::find_questions(ctx.conn, phase_id)? {
        delete_question_deep(ctx, question.id)?;
    }
    test_repo::delete_phase(ctx.conn, phase_id)?;
    Ok(())
}

fn delete_question_deep(ctx: &mut PatchCtx<'_>, question_id: i64) -> Result<()> {
    for option in test_repo::find_options(ctx.conn, question_id)? {
        delete_option_deep(ctx, option.id)?;
    }
    let stored = test_repo::find_question(ctx.conn, question_id)?
        .ok_or_else(|| SurveyError::NotFound(format!("test question {question_id}")))?;
    test_repo::delete_question(ctx.conn, question_id)?;
    collect_orphan(ctx, stored.image_id)?;
    Ok(())
}

fn delete_option_deep(ctx: &mut PatchCtx<'_>, option_id: i64) -> Result<()> {
    let stored = test_repo::find_option(ctx.conn, option_id)?
        .ok_or_else(|| SurveyError::NotFound(format!("test option {option_id}")))?;
    test_repo::delete_option(ctx.conn, option_id)?;
    collect_orphan(ctx, stored.image_id)?;
    Ok(())
}
