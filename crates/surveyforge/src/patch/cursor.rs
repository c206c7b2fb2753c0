//! Positional image-slot cursor.
//!
//! A PATCH carries its image files as one flat array, parallel to the
//! pre-order traversal of the image-capable nodes in the update tree.
//! Each image-capable node consumes exactly one slot when visited,
//! whether or not anything about it changed, so the pairing between
//! nodes and slots stays stable across submissions.
//!
//! Slot grammar:
//! - absent entry (`None`)          => keep the current image
//! - present but empty byte vector  => clear the image
//! - present with bytes             => save or replace the image

use crate::store::ImageUpload;

/// What one consumed slot asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Keep,
    Clear,
    Set(ImageUpload),
}

impl SlotValue {
    pub fn from_slot(slot: Option<ImageUpload>) -> Self {
        match slot {
            None => SlotValue::Keep,
            Some(upload) if upload.bytes.is_empty() => SlotValue::Clear,
            Some(upload) => SlotValue::Set(upload),
        }
    }
}

/// Consumes upload slots in traversal order. `next()` never fails:
/// reading past the end yields `Keep`.
#[derive(Debug)]
pub struct ImageSlotCursor {
    slots: Vec<Option<ImageUpload>>,
    position: usize,
}

impl ImageSlotCursor {
    pub fn new(slots: Vec<Option<ImageUpload>>) -> Self {
        Self { slots, position: 0 }
    }

    pub fn next(&mut self) -> SlotValue {
        let slot = self.slots.get_mut(self.position).and_then(Option::take);
        self.position += 1;
        SlotValue::from_slot(slot)
    }

    /// How many slots have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: Vec<u8>) -> ImageUpload {
        ImageUpload { bytes, alt: None }
    }

    #[test]
    fn test_slot_grammar() {
        let mut cursor = ImageSlotCursor::new(vec![
            None,
            Some(upload(vec![])),
            Some(upload(vec![1, 2])),
        ]);
        assert_eq!(cursor.next(), SlotValue::Keep);
        assert_eq!(cursor.next(), SlotValue::Clear);
        assert_eq!(cursor.next(), SlotValue::Set(upload(vec![1, 2])));
        assert_eq!(cursor.consumed(), 3);
    }

    #[test]
    fn test_past_the_end_is_keep() {
        let mut cursor = ImageSlotCursor::new(vec![]);
        assert_eq!(cursor.next(), SlotValue::Keep);
        assert_eq!(cursor.next(), SlotValue::Keep);
        assert_eq!(cursor.consumed(), 2);
    }
}
