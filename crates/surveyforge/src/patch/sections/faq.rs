//! FAQ section. Plain text rows, no images.

use crate::db::home_repo::{self, FaqRow};
use crate::error::{Result, SurveyError};
use crate::patch::cursor::SlotValue;
use crate::patch::reconcile::{PatchCtx, SectionAdapter};
use crate::patch::update::FaqUpdate;

pub struct FaqAdapter {
    pub version: i64,
}

impl SectionAdapter for FaqAdapter {
    type Update = FaqUpdate;

    fn label(&self) -> &'static str {
        "faq"
    }

    fn update_id(update: &FaqUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let faqs = home_repo::find_faqs(ctx.conn, self.version)?;
        Ok(faqs.into_iter().map(|f| f.id).collect())
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &FaqUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<i64> {
        let id = home_repo::insert_faq(
            ctx.conn,
            &FaqRow {
                id: 0,
                config_version: self.version,
                ord,
                question: update.question.clone(),
                answer: update.answer.clone(),
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &FaqUpdate,
        ord: i64,
        _slot: SlotValue,
    ) -> Result<bool> {
        let stored = home_repo::find_faq(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("faq {id}")))?;

        let desired = FaqRow {
            id,
            config_version: stored.config_version,
            ord,
            question: update.question.clone(),
            answer: update.answer.clone(),
        };

        if desired != stored {
            home_repo::update_faq(ctx.conn, &desired)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        home_repo::delete_faq(ctx.conn, id)?;
        Ok(())
    }
}
