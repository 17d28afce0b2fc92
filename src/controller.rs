//! Turns timeline interaction into planner intents and lays out plan blocks.
//!
//! Blocks always span the full row width. Overlapping plans are not moved
//! apart; they stack in paint order, and the block under the pointer is
//! raised to the top.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::time_grid::{self, TimeOfDay};
use crate::model::{PlanDraft, PlanId, PlanItem};

/// Pixels of leading context kept above the now line when scrolling to it.
pub const SCROLL_CONTEXT: f32 = 100.0;

/// A plan block positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub item: PlanItem,
    pub top: u16,
    pub height: u16,
}

impl BlockLayout {
    /// Whether a canvas offset falls inside the block.
    pub fn contains(&self, offset: f32) -> bool {
        let top = self.top as f32;
        offset >= top && offset < top + self.height as f32
    }
}

/// What a click on the timeline asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineIntent {
    /// Empty canvas: draft a new plan at the clicked slot.
    Create(PlanDraft),
    /// A block: edit the existing plan.
    Edit(PlanDraft),
}

#[derive(Debug, Default)]
pub struct TimelineController {
    raised: Option<PlanId>,
}

impl TimelineController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raised(&self) -> Option<&PlanId> {
        self.raised.as_ref()
    }

    /// Remember which block the pointer is over.
    pub fn set_raised(&mut self, id: Option<PlanId>) {
        self.raised = id;
    }

    /// Draft for a click on empty canvas at `pixel_offset`.
    pub fn on_canvas_click(&self, date: NaiveDate, pixel_offset: f32) -> PlanDraft {
        let snapped = time_grid::time_of_offset(pixel_offset);
        let (start, end) = time_grid::default_range_from(snapped);
        PlanDraft::new(date, start, end)
    }

    /// Draft for editing an existing block.
    pub fn on_block_click(&self, item: &PlanItem) -> PlanDraft {
        PlanDraft::from(item)
    }

    /// Draft behind the "Add Plan" button.
    pub fn add_template(&self, date: NaiveDate) -> PlanDraft {
        PlanDraft::new(
            date,
            TimeOfDay::from_minutes_clamped(9 * 60),
            TimeOfDay::from_minutes_clamped(10 * 60),
        )
    }

    /// Resolve a click. A hit on a block is consumed by that block and never
    /// also creates a plan.
    pub fn click(&self, layouts: &[BlockLayout], date: NaiveDate, pixel_offset: f32) -> TimelineIntent {
        match self.hit_test(layouts, pixel_offset) {
            Some(block) => TimelineIntent::Edit(self.on_block_click(&block.item)),
            None => TimelineIntent::Create(self.on_canvas_click(date, pixel_offset)),
        }
    }

    /// Topmost block under `offset`, honouring paint order.
    pub fn hit_test<'a>(&self, layouts: &'a [BlockLayout], offset: f32) -> Option<&'a BlockLayout> {
        self.paint_order(layouts)
            .into_iter()
            .rev()
            .find(|block| block.contains(offset))
    }

    /// Position every plan. Order follows `items`.
    pub fn layout_of(&self, items: &[PlanItem]) -> Vec<BlockLayout> {
        items
            .iter()
            .map(|item| BlockLayout {
                top: time_grid::position_of(item.start_time),
                height: time_grid::duration_height(item.start_time, item.end_time),
                item: item.clone(),
            })
            .collect()
    }

    /// Blocks bottom to top: input order, with the raised block last.
    pub fn paint_order<'a>(&self, layouts: &'a [BlockLayout]) -> Vec<&'a BlockLayout> {
        let mut ordered: Vec<&BlockLayout> = layouts.iter().collect();
        if let Some(raised) = &self.raised {
            if let Some(pos) = ordered.iter().position(|b| &b.item.id == raised) {
                let block = ordered.remove(pos);
                ordered.push(block);
            }
        }
        ordered
    }
}

/// Offset of the current-time line, shown only when viewing today.
pub fn now_indicator_offset(viewed: NaiveDate, now: NaiveDateTime) -> Option<u16> {
    if viewed == now.date() {
        Some(time_grid::position_of(TimeOfDay::from(now.time())))
    } else {
        None
    }
}

/// Where to scroll when a day is opened: just above the now line on today,
/// nowhere in particular otherwise.
pub fn initial_scroll(viewed: NaiveDate, now: NaiveDateTime) -> Option<f32> {
    now_indicator_offset(viewed, now).map(|offset| (offset as f32 - SCROLL_CONTEXT).max(0.0))
}
