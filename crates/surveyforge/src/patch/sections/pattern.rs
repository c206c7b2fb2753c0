//! Username-pattern section. Singular, not ordered: the config either
//! links a pattern or it doesn't. Pattern rows form a shared library —
//! unlinking leaves the row in place, and cloned versions share it.

use crate::db::config_repo::{self, ConfigRow};
use crate::error::{Result, SurveyError};
use crate::patch::reconcile::PatchCtx;
use crate::patch::update::PatternUpdate;

/// Reconciles the config's pattern link. Mutates `config.pattern_id`
/// in place; the caller persists the config row.
pub fn reconcile_pattern(
    ctx: &mut PatchCtx<'_>,
    config: &mut ConfigRow,
    update: Option<&PatternUpdate>,
) -> Result<bool> {
    let Some(update) = update else {
        let changed = config.pattern_id.is_some();
        config.pattern_id = None;
        return Ok(changed);
    };

    match update.id {
        None => {
            let id = config_repo::insert_pattern(ctx.conn, &update.name, &update.regex)?;
            config.pattern_id = Some(id);
            Ok(true)
        }
        Some(id) => {
            let stored = config_repo::find_pattern(ctx.conn, id)?
                .ok_or_else(|| SurveyError::NotFound(format!("pattern {id}")))?;

            let mut changed = false;
            if stored.name != update.name || stored.regex != update.regex {
                config_repo::update_pattern(ctx.conn, id, &update.name, &update.regex)?;
                changed = true;
            }
            if config.pattern_id != Some(id) {
                config.pattern_id = Some(id);
                changed = true;
            }
            Ok(changed)
        }
    }
}
