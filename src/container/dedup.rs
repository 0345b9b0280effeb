//! Name and content deduplication
//!
//! Linear scan over the metadata table around a freshly populated slot:
//! an identifier collision is an error, a SHA-256 match makes the new
//! slot share the existing payload ranges instead of storing a copy.

use crate::error::{ImgFsError, Result};

use super::slot::Slot;
use super::{Resolution, NB_RES};

/// Deduplicate the slot at `index` against every other valid slot.
///
/// Clears the target's original-resolution offset first; if it is still
/// zero afterwards no content duplicate exists and the caller must append
/// the payload itself. On `DuplicateId` the caller rolls the target back.
pub(crate) fn name_and_content_dedup(slots: &mut [Slot], index: usize) -> Result<()> {
    slots[index].offset[Resolution::Orig.index()] = 0;

    let target_id = slots[index].img_id.clone();
    let target_sha = slots[index].sha;

    let mut shared: Option<([u32; NB_RES], [u64; NB_RES])> = None;
    for (i, slot) in slots.iter().enumerate() {
        if i == index || !slot.is_valid() {
            continue;
        }
        if slot.img_id == target_id {
            return Err(ImgFsError::DuplicateId(target_id));
        }
        if slot.sha == target_sha {
            // same content under a different id: share its payload ranges
            shared = Some((slot.size, slot.offset));
        }
    }

    if let Some((size, offset)) = shared {
        slots[index].size = size;
        slots[index].offset = offset;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::slot::NON_EMPTY;

    fn valid_slot(img_id: &str, sha_byte: u8) -> Slot {
        let mut slot = Slot::default();
        slot.set_img_id(img_id);
        slot.sha = [sha_byte; 32];
        slot.size = [10, 20, 30];
        slot.offset = [100, 200, 300];
        slot.is_valid = NON_EMPTY;
        slot
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut slots = vec![valid_slot("pic", 1), valid_slot("pic", 2)];
        let err = name_and_content_dedup(&mut slots, 1).unwrap_err();
        assert!(matches!(err, ImgFsError::DuplicateId(_)));
    }

    #[test]
    fn matching_sha_shares_payload_ranges() {
        let mut slots = vec![valid_slot("a", 7), valid_slot("b", 7)];
        slots[1].size = [0, 0, 30];
        slots[1].offset = [0, 0, 999];

        name_and_content_dedup(&mut slots, 1).unwrap();

        assert_eq!(slots[1].size, slots[0].size);
        assert_eq!(slots[1].offset, slots[0].offset);
    }

    #[test]
    fn no_match_leaves_orig_offset_cleared() {
        let mut slots = vec![valid_slot("a", 1), valid_slot("b", 2)];
        slots[1].offset[Resolution::Orig.index()] = 555;

        name_and_content_dedup(&mut slots, 1).unwrap();

        assert_eq!(slots[1].offset[Resolution::Orig.index()], 0);
    }

    #[test]
    fn tombstoned_slots_are_ignored() {
        let mut slots = vec![valid_slot("pic", 3), valid_slot("pic", 3)];
        slots[0].is_valid = 0;

        name_and_content_dedup(&mut slots, 1).unwrap();
        assert_eq!(slots[1].offset[Resolution::Orig.index()], 0);
    }
}
