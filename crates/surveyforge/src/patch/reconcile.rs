//! Generic ordered-list reconciliation.
//!
//! Every ordered section of a PATCH (info cards, FAQs, form questions,
//! options, groups, phases...) follows the same protocol; the section
//! differences live behind [`SectionAdapter`]. The driver walks the
//! submitted list, creating, matching and updating as it goes, and
//! deletes whatever stored item was not mentioned.

use std::collections::BTreeMap;

use rusqlite::Connection;

use super::cursor::{ImageSlotCursor, SlotValue};
use crate::error::{Result, SurveyError};
use crate::store::{FileJournal, ImageStore};

/// Shared mutable state for one PATCH: the open transaction's
/// connection, the image store, the staged file operations and the
/// positional slot cursor.
pub struct PatchCtx<'a> {
    pub conn: &'a Connection,
    pub store: &'a ImageStore,
    pub journal: &'a mut FileJournal,
    pub cursor: &'a mut ImageSlotCursor,
}

/// Per-section glue for the reconciliation driver.
///
/// An adapter instance is scoped to one parent (e.g. the options of one
/// question); `stored_ids` lists that scope in `ord` order.
pub trait SectionAdapter {
    type Update;

    /// Section name for error messages and logs.
    fn label(&self) -> &'static str;

    fn update_id(update: &Self::Update) -> Option<i64>;

    fn stored_ids(&self, ctx: &mut PatchCtx<'_>) -> Result<Vec<i64>>;

    /// Whether nodes of this section consume an image slot when visited.
    fn image_capable(&self) -> bool {
        false
    }

    /// Inserts a new row at `ord`. Runs before child recursion.
    fn create(
        &self,
        ctx: &mut PatchCtx<'_>,
        update: &Self::Update,
        ord: i64,
        slot: SlotValue,
    ) -> Result<i64>;

    /// Diffs the stored row against the update and writes only when
    /// something differs (including `ord` and the image slot). Returns
    /// whether anything was written.
    fn apply(
        &self,
        ctx: &mut PatchCtx<'_>,
        id: i64,
        update: &Self::Update,
        ord: i64,
        slot: SlotValue,
    ) -> Result<bool>;

    /// Reconciles the item's children. Called for created and matched
    /// items alike, so child slots are consumed either way.
    fn recurse(&self, _ctx: &mut PatchCtx<'_>, _id: i64, _update: &Self::Update) -> Result<bool> {
        Ok(false)
    }

    /// Consulted before any deletion of a stored item. Errors abort the
    /// whole PATCH.
    fn guard_delete(&self, _ctx: &mut PatchCtx<'_>, _id: i64) -> Result<()> {
        Ok(())
    }

    /// Deletes a stored item, its children and any images they own.
    fn delete(&self, ctx: &mut PatchCtx<'_>, id: i64) -> Result<()>;
}

/// Reconciles one scope against the submitted list.
///
/// `None` deletes the scope entirely. Returns whether anything changed;
/// resubmitting an identical list yields `false` and performs no
/// writes.
pub fn reconcile<A: SectionAdapter>(
    adapter: &A,
    ctx: &mut PatchCtx<'_>,
    updates: Option<&[A::Update]>,
) -> Result<bool> {
    let stored = adapter.stored_ids(ctx)?;

    let Some(updates) = updates else {
        let changed = !stored.is_empty();
        for id in stored {
            adapter.guard_delete(ctx, id)?;
            adapter.delete(ctx, id)?;
        }
        return Ok(changed);
    };

    // false = stored but not yet matched by an update item.
    let mut processed: BTreeMap<i64, bool> = stored.iter().map(|&id| (id, false)).collect();
    let mut changed = false;

    for (index, update) in updates.iter().enumerate() {
        let ord = index as i64;
        let slot = if adapter.image_capable() {
            ctx.cursor.next()
        } else {
            SlotValue::Keep
        };

        match A::update_id(update) {
            None => {
                let id = adapter.create(ctx, update, ord, slot)?;
                adapter.recurse(ctx, id, update)?;
                changed = true;
            }
            Some(id) => {
                match processed.get_mut(&id) {
                    Some(seen) if !*seen => *seen = true,
                    Some(_) => {
                        return Err(SurveyError::Conflict(format!(
                            "{} {id} submitted twice",
                            adapter.label()
                        )))
                    }
                    None => {
                        return Err(SurveyError::NotFound(format!(
                            "{} {id}",
                            adapter.label()
                        )))
                    }
                }
                let updated = adapter.apply(ctx, id, update, ord, slot)?;
                let children = adapter.recurse(ctx, id, update)?;
                changed = changed || updated || children;
            }
        }
    }

    for (id, seen) in processed {
        if !seen {
            adapter.guard_delete(ctx, id)?;
            adapter.delete(ctx, id)?;
            changed = true;
        }
    }

    Ok(changed)
}
