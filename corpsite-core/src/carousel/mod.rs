//! Windowed horizontal carousel over a fully loaded list
//!
//! Pure arithmetic: the caller feeds item count, measured width and text
//! direction, and reads back the window position, button states and the
//! translation to apply to the card track.

use std::ops::Range;

use crate::config::CarouselConfig;
use crate::i18n::TextDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    config: CarouselConfig,
    item_count: usize,
    container_width: u32,
    direction: TextDirection,
    start_index: usize,
}

impl Carousel {
    pub fn new(config: CarouselConfig, item_count: usize, container_width: u32, direction: TextDirection) -> Self {
        Self {
            config,
            item_count,
            container_width,
            direction,
            start_index: 0,
        }
    }

    /// Horizontal distance between the left edges of two neighbouring cards
    pub fn stride(&self) -> u32 {
        self.config.card_width.saturating_add(self.config.gap).max(1)
    }

    pub fn cards_per_view(&self) -> usize {
        ((self.container_width / self.stride()) as usize).max(1)
    }

    pub fn max_start_index(&self) -> usize {
        self.item_count.saturating_sub(self.cards_per_view())
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn direction(&self) -> TextDirection {
        self.direction
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.clamp();
    }

    pub fn resize(&mut self, container_width: u32) {
        self.container_width = container_width;
        self.clamp();
    }

    pub fn set_direction(&mut self, direction: TextDirection) {
        self.direction = direction;
        self.clamp();
    }

    /// Short lists sit centred with no controls and never scroll
    pub fn is_centered(&self) -> bool {
        self.item_count <= self.config.center_threshold
    }

    pub fn controls_visible(&self) -> bool {
        !self.is_centered()
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_centered() && self.start_index < self.max_start_index()
    }

    pub fn can_go_previous(&self) -> bool {
        !self.is_centered() && self.start_index > 0
    }

    /// Advance one card; false at the end
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.start_index += 1;
        true
    }

    /// Step back one card; false at the start
    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.start_index -= 1;
        true
    }

    /// Left arrow: backwards in LTR, forwards in RTL
    pub fn press_left(&mut self) -> bool {
        match self.direction {
            TextDirection::Ltr => self.previous(),
            TextDirection::Rtl => self.next(),
        }
    }

    pub fn press_right(&mut self) -> bool {
        match self.direction {
            TextDirection::Ltr => self.next(),
            TextDirection::Rtl => self.previous(),
        }
    }

    pub fn left_enabled(&self) -> bool {
        match self.direction {
            TextDirection::Ltr => self.can_go_previous(),
            TextDirection::Rtl => self.can_go_next(),
        }
    }

    pub fn right_enabled(&self) -> bool {
        match self.direction {
            TextDirection::Ltr => self.can_go_next(),
            TextDirection::Rtl => self.can_go_previous(),
        }
    }

    /// Track translation in pixels: negative in LTR, positive in RTL
    pub fn translate_offset(&self) -> i64 {
        if self.is_centered() {
            return 0;
        }
        let distance = self.start_index as i64 * i64::from(self.stride());
        match self.direction {
            TextDirection::Ltr => -distance,
            TextDirection::Rtl => distance,
        }
    }

    /// Indices of the cards currently in view
    pub fn visible_range(&self) -> Range<usize> {
        if self.is_centered() {
            return 0..self.item_count;
        }
        let end = (self.start_index + self.cards_per_view()).min(self.item_count);
        self.start_index..end
    }

    fn clamp(&mut self) {
        let max = if self.is_centered() { 0 } else { self.max_start_index() };
        self.start_index = self.start_index.min(max);
    }
}
