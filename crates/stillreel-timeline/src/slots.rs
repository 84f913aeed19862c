//! Fixed-capacity registry of image slots.
//!
//! Slots are numbered `1..=N` and addressed by 0-based index. Each slot owns
//! its image outright; replacing or clearing it drops the previous asset. A
//! slot filled from a video also holds a [`SharedVideo`] handle, so the video
//! stays alive exactly as long as some slot (or sampler) still refers to it.

use std::sync::Arc;

use stillreel_core::{ImageAsset, ReelError, Result, SharedVideo, DEFAULT_SLOT_COUNT};
use tracing::debug;

use crate::natural::sort_naturally_by_key;

/// What a slot currently holds.
#[derive(Debug, Clone, Default)]
enum SlotContent {
    #[default]
    Empty,
    Image(ImageAsset),
    VideoFrame {
        asset: ImageAsset,
        source: SharedVideo,
        timestamp: f64,
    },
}

/// One addressable image position.
#[derive(Debug, Clone)]
pub struct Slot {
    id: u32,
    content: SlotContent,
}

impl Slot {
    fn empty(id: u32) -> Self {
        Self {
            id,
            content: SlotContent::Empty,
        }
    }

    /// 1-based slot id, as referenced by the timeline.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        match &self.content {
            SlotContent::Empty => None,
            SlotContent::Image(asset) | SlotContent::VideoFrame { asset, .. } => Some(asset),
        }
    }

    /// Video this slot's frame was captured from, if any.
    pub fn source_video(&self) -> Option<&SharedVideo> {
        match &self.content {
            SlotContent::VideoFrame { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Capture timestamp in seconds; only set alongside a source video.
    pub fn timestamp(&self) -> Option<f64> {
        match &self.content {
            SlotContent::VideoFrame { timestamp, .. } => Some(*timestamp),
            _ => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        !matches!(self.content, SlotContent::Empty)
    }

    /// Whether the frame can be re-picked from its source video.
    pub fn has_provenance(&self) -> bool {
        matches!(self.content, SlotContent::VideoFrame { .. })
    }

    fn replace(&mut self, content: SlotContent) {
        let previous = std::mem::replace(&mut self.content, content);
        if let Some(asset) = match &previous {
            SlotContent::Empty => None,
            SlotContent::Image(asset) | SlotContent::VideoFrame { asset, .. } => Some(asset),
        } {
            debug!(slot = self.id, name = %asset.name, "Releasing slot asset");
        }
    }
}

/// Ordered, fixed-size collection of slots.
#[derive(Debug, Clone)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    /// Create a registry of `capacity` empty slots with ids `1..=capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (1..=capacity as u32).map(Slot::empty).collect(),
        }
    }

    /// Number of slots; never changes.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot at a 0-based index.
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Slot by 1-based id.
    pub fn slot_by_id(&self, id: u32) -> Option<&Slot> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.slots.get(index))
    }

    /// Asset of a populated slot, by 1-based id.
    pub fn asset_for_id(&self, id: u32) -> Option<&ImageAsset> {
        self.slot_by_id(id).and_then(Slot::asset)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Populated slots in id order.
    pub fn populated(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_populated())
    }

    pub fn populated_count(&self) -> usize {
        self.populated().count()
    }

    /// True when no slot holds an image.
    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    /// Number of slots citing `video` as provenance.
    pub fn video_ref_count(&self, video: &SharedVideo) -> usize {
        self.slots
            .iter()
            .filter_map(Slot::source_video)
            .filter(|v| Arc::ptr_eq(v, video))
            .count()
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Slot> {
        let capacity = self.slots.len();
        self.slots.get_mut(index).ok_or_else(|| {
            ReelError::InvalidParameter(format!(
                "Slot index {index} out of range (0-{})",
                capacity.saturating_sub(1)
            ))
        })
    }

    /// Put a fresh image into a slot, dropping any provenance.
    pub fn assign(&mut self, index: usize, asset: ImageAsset) -> Result<()> {
        self.slot_mut(index)?.replace(SlotContent::Image(asset));
        Ok(())
    }

    /// Assign several images starting at `start_index`, in natural name order.
    ///
    /// Images that would land past the last slot are dropped. Returns how many
    /// were assigned.
    pub fn batch_assign(&mut self, mut assets: Vec<ImageAsset>, start_index: usize) -> usize {
        sort_naturally_by_key(&mut assets, |a| a.name.as_str());

        let capacity = self.slots.len();
        let mut assigned = 0;
        for (offset, asset) in assets.into_iter().enumerate() {
            let index = start_index + offset;
            if index >= capacity {
                debug!(name = %asset.name, index, "Dropping image past registry capacity");
                continue;
            }
            self.slots[index].replace(SlotContent::Image(asset));
            assigned += 1;
        }
        assigned
    }

    /// Put a captured video frame into a slot, remembering where it came from.
    pub fn assign_from_video_frame(
        &mut self,
        index: usize,
        asset: ImageAsset,
        source: SharedVideo,
        timestamp: f64,
    ) -> Result<()> {
        self.slot_mut(index)?.replace(SlotContent::VideoFrame {
            asset,
            source,
            timestamp,
        });
        Ok(())
    }

    /// Empty a single slot.
    pub fn clear(&mut self, index: usize) -> Result<()> {
        self.slot_mut(index)?.replace(SlotContent::Empty);
        Ok(())
    }

    /// Release everything and reset every slot to empty.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.replace(SlotContent::Empty);
        }
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}
