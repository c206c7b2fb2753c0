//! Section adapter families.

pub mod faq;
pub mod form;
pub mod info_card;
pub mod pattern;
pub mod test;
pub mod translation;

use super::cursor::SlotValue;
use super::reconcile::PatchCtx;
use crate::error::Result;
use crate::store::ImageCategory;

/// Outcome of applying an image slot against a node's current image.
pub(crate) struct ImageChange {
    /// Image id the node should now reference.
    pub image_id: Option<i64>,
    pub changed: bool,
    /// Previously referenced image to garbage-collect after the node
    /// row has been rewritten (so the unused check sees the unlink).
    pub orphan: Option<i64>,
}

pub(crate) fn resolve_image(
    ctx: &mut PatchCtx<'_>,
    current: Option<i64>,
    slot: SlotValue,
    category: ImageCategory,
) -> Result<ImageChange> {
    match slot {
        SlotValue::Keep => Ok(ImageChange {
            image_id: current,
            changed: false,
            orphan: None,
        }),
        SlotValue::Clear => Ok(ImageChange {
            image_id: None,
            changed: current.is_some(),
            orphan: current,
        }),
        SlotValue::Set(upload) => match current {
            Some(id) => {
                let changed = ctx.store.update(ctx.conn, ctx.journal, id, category, &upload)?;
                Ok(ImageChange {
                    image_id: Some(id),
                    changed,
                    orphan: None,
                })
            }
            None => {
                let id = ctx.store.save(ctx.conn, ctx.journal, category, &upload)?;
                Ok(ImageChange {
                    image_id: Some(id),
                    changed: true,
                    orphan: None,
                })
            }
        },
    }
}

/// Garbage-collects an unlinked image, if it is no longer referenced.
pub(crate) fn collect_orphan(ctx: &mut PatchCtx<'_>, orphan: Option<i64>) -> Result<()> {
    if let Some(id) = orphan {
        ctx.store.delete_if_unused(ctx.conn, ctx.journal, id)?;
    }
    Ok(())
}
