//! The 3×3 award grid: eight awards around the edge, spin button in the
//! middle.

use crate::{
    api::{
        ApiResult,
        Award,
        RaffleApi,
    },
    config::Session,
};
use thiserror::Error;
use tracing::{
    info,
    warn,
};

pub const RING_LEN: usize = 8;

/// `(x, y)` of each award slot, walking clockwise from the top-left corner.
pub const RING_POSITIONS: [(u16, u16); RING_LEN] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (2, 1),
    (2, 2),
    (1, 2),
    (0, 2),
    (0, 1),
];

pub const SPIN_BUTTON: (u16, u16) = (1, 1);

#[derive(Debug, Error, Eq, PartialEq)]
pub enum GridError {
    #[error("award grid needs exactly 8 awards, got {0}")]
    WrongSize(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub index: usize,
    pub x: u16,
    pub y: u16,
    pub award: Award,
}

impl GridCell {
    pub fn is_locked(&self) -> bool {
        !self.award.unlocked
    }

    pub fn label(&self) -> String {
        if self.award.unlocked {
            self.award.title.clone()
        } else {
            format!("Unlocks in {} more draws", self.award.draws_to_unlock)
        }
    }

    /// Row-then-column key naming the slot's artwork.
    pub fn slot_key(&self) -> String {
        format!("{}{}", self.y, self.x)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AwardGrid {
    cells: Vec<GridCell>,
}

impl AwardGrid {
    /// Replaces every cell at once. Anything but exactly eight awards leaves
    /// the grid as it was.
    pub fn replace(&mut self, awards: Vec<Award>) -> Result<(), GridError> {
        if awards.len() != RING_LEN {
            return Err(GridError::WrongSize(awards.len()));
        }
        self.cells = awards
            .into_iter()
            .zip(RING_POSITIONS)
            .enumerate()
            .map(|(index, (award, (x, y)))| GridCell { index, x, y, award })
            .collect();
        Ok(())
    }

    /// Applies a fetch result, logging and keeping the previous cells on any
    /// failure. Returns whether the grid changed.
    pub fn apply(&mut self, fetched: ApiResult<Vec<Award>>) -> bool {
        let awards = match fetched {
            Ok(awards) => awards,
            Err(err) => {
                warn!(error = %err, "award list fetch failed; keeping previous grid");
                return false;
            }
        };
        match self.replace(awards) {
            Ok(()) => {
                info!("award grid updated");
                true
            }
            Err(err) => {
                warn!(error = %err, "award list rejected; keeping previous grid");
                false
            }
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn cell_at(&self, x: u16, y: u16) -> Option<&GridCell> {
        self.cells.iter().find(|cell| cell.x == x && cell.y == y)
    }
}

/// Fetches the award list for the session and applies it to `grid`.
pub async fn load<A: RaffleApi>(api: &A, session: &Session, grid: &mut AwardGrid) -> bool {
    if let Err(err) = session.require_complete() {
        warn!(error = %err, "skipping award list fetch");
        return false;
    }
    grid.apply(api.award_list(session).await)
}
