//! Information-card section.

use super::{collect_orphan, resolve_image};
use crate::db::home_repo::{self, InfoCardRow};
use crate::error::{Result, SurveyError};
use crate::patch::cursor::SlotValue;
use crate::patch::reconcile::{PatchCtx, SectionAdapter};
use crate::patch::update::{normalize, InfoCardUpdate};
use crate::store::ImageCategory;

pub struct InfoCardAdapter {
    pub version: i64,
}

impl SectionAdapter for InfoCardAdapter {
    type Update = InfoCardUpdate;

    fn label(&self) -> &'static str {
        "info card"
    }

    fn update_id(update: &InfoCardUpdate) -> Option<i64> {
        update.id
    }

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>> {
        let cards = home_repo::find_info_cards(ctx.conn, self.version)?;
        Ok(cards.into_iter().map(|c| c.id).collect())
    }

    fn image_capable(&self) -> bool {
        true
    }

    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &InfoCardUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64> {
        let change = resolve_image(ctx, None, slot, ImageCategory::InfoCard)?;
        let id = home_repo::insert_info_card(
            ctx.conn,
            &InfoCardRow {
                id: 0,
                config_version: self.version,
                ord,
                title: update.title.clone(),
                description: normalize(update.description.as_deref()),
                color: update.color,
                icon_id: change.image_id,
            },
        )?;
        Ok(id)
    }

    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &InfoCardUpdate,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool> {
        let stored = home_repo::find_info_card(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("info card {id}")))?;
        let change = resolve_image(ctx, stored.icon_id, slot, ImageCategory::InfoCard)?;

        let desired = InfoCardRow {
            id,
            config_version: stored.config_version,
            ord,
            title: update.title.clone(),
            description: normalize(update.description.as_deref()),
            color: update.color,
            icon_id: change.image_id,
        };

        let row_changed = desired != stored;
        if row_changed {
            home_repo::update_info_card(ctx.conn, &desired)?;
        }
        collect_orphan(ctx, change.orphan)?;
        Ok(row_changed || change.changed)
    }

    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()> {
        let stored = home_repo::find_info_card(ctx.conn, id)?
            .ok_or_else(|| SurveyError::NotFound(format!("info card {id}")))?;
        home_repo::delete_info_card(ctx.conn, id)?;
        collect_orphan(ctx, stored.icon_id)?;
        Ok(())
    }
}
