//! Single-line scrolling ticker of recent winners.
//!
//! Offsets and widths are terminal columns, not chars: CJK titles take two
//! columns per glyph.

use crate::api::RecentWinner;
use itertools::Itertools;
use unicode_width::UnicodeWidthChar;

const SEPARATOR: &str = "  ·  ";

#[derive(Clone, Debug, Default)]
pub struct MarqueeTicker {
    text: String,
    offset: usize,
}

impl MarqueeTicker {
    /// Replaces the ticker text. The scroll position is kept where possible
    /// so a poll that returns the same winners does not restart the ticker.
    pub fn set_entries(&mut self, winners: &[RecentWinner]) {
        let text = if winners.is_empty() {
            String::new()
        } else {
            let line = winners
                .iter()
                .map(|w| single_line(&format!("{} won {}", w.user_id, w.award_title)))
                .join(SEPARATOR);
            format!("{line}{SEPARATOR}")
        };
        if text != self.text {
            self.text = text;
            self.offset = match self.cycle_width() {
                0 => 0,
                cycle => self.offset % cycle,
            };
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn cycle_width(&self) -> usize {
        self.text.chars().filter_map(|c| c.width()).sum()
    }

    /// Scrolls one column to the left.
    pub fn advance(&mut self) {
        let cycle = self.cycle_width();
        if cycle > 0 {
            self.offset = (self.offset + 1) % cycle;
        }
    }

    /// Exactly `width` columns of the looping text starting at the current
    /// offset. A wide glyph cut by either edge is replaced with spaces.
    pub fn frame(&self, width: usize) -> String {
        let cycle = self.cycle_width();
        if cycle == 0 || width == 0 {
            return String::new();
        }
        let start = self.offset % cycle;
        let mut out = String::with_capacity(width);
        let mut filled = 0;
        let mut column = 0;
        for ch in self.text.chars().cycle() {
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            let end = column + w;
            column = end;
            if end <= start {
                continue;
            }
            if end - w < start {
                let visible = (end - start).min(width - filled);
                out.extend(std::iter::repeat_n(' ', visible));
                filled += visible;
            } else if filled + w > width {
                out.extend(std::iter::repeat_n(' ', width - filled));
                filled = width;
            } else {
                out.push(ch);
                filled += w;
            }
            if filled == width {
                break;
            }
        }
        out
    }
}

// Tabs and newlines in titles would otherwise vanish from the rendered loop.
fn single_line(entry: &str) -> String {
    entry
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
