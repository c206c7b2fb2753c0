//! Translation section. Key-addressed rather than ordered: submitted
//! entries are upserts against the shared key table, keys not
//! mentioned keep their current value, and nothing is ever deleted
//! here. An unknown key is an error, not an implicit key creation.

use std::collections::HashMap;

use crate::db::config_repo;
use crate::error::{Result, SurveyError};
use crate::patch::reconcile::PatchCtx;
use crate::patch::update::TranslationUpdate;

pub fn reconcile_translations(
    ctx: &mut PatchCtx<'_>,
    version: i64,
    updates: Option<&[TranslationUpdate]>,
) -> Result<bool> {
    let Some(updates) = updates else {
        return Ok(false);
    };
    if updates.is_empty() {
        return Ok(false);
    }

    let key_ids: HashMap<String, i64> = config_repo::find_all_translation_keys(ctx.conn)?
        .into_iter()
        .map(|k| (k.key, k.id))
        .collect();

    let current: HashMap<i64, (i64, String)> =
        config_repo::find_translation_values(ctx.conn, version)?
            .into_iter()
            .map(|v| (v.key_id, (v.id, v.value)))
            .collect();

    let mut changed = false;
    for update in updates {
        let key_id = *key_ids
            .get(&update.key)
            .ok_or_else(|| SurveyError::NotFound(format!("translation key '{}'", update.key)))?;

        match current.get(&key_id) {
            Some((_, value)) if *value == update.value => {}
            Some((row_id, _)) => {
                config_repo::update_translation_value(ctx.conn, *row_id, &update.value)?;
                changed = true;
            }
            None => {
                config_repo::insert_translation_value(ctx.conn, version, key_id, &update.value)?;
                changed = true;
            }
        }
    }
    Ok(changed)
}
