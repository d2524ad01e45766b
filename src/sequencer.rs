//! Draw sequencing for the award grid: Idle → Spinning → Settling → Idle.
//!
//! Activation starts the wheel and hands out a [`DrawTicket`]. The ticket's
//! request result is fed back through [`DrawSequencer::resolve`], which
//! commands the wheel to stop and returns the [`Landing`] to wait on. Once
//! the landing completes, [`DrawSequencer::settle`] returns to idle.

use crate::{
    api::{
        ApiResult,
        DrawAward,
        RaffleApi,
    },
    config::Session,
    wheel::{
        Landing,
        Wheel,
    },
};
use tracing::{
    debug,
    error,
    info,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DrawTicket(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    Won(DrawAward),
    Failed { message: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawPhase {
    Idle,
    Spinning {
        ticket: DrawTicket,
    },
    Settling {
        ticket: DrawTicket,
        outcome: DrawOutcome,
    },
}

#[derive(Debug)]
pub struct DrawResolution {
    pub ticket: DrawTicket,
    pub result: ApiResult<DrawAward>,
}

impl DrawTicket {
    /// Performs the remote draw this ticket stands for.
    pub async fn request<A: RaffleApi>(self, api: &A, session: &Session) -> DrawResolution {
        let result = api.draw(session).await;
        DrawResolution {
            ticket: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct DrawSequencer {
    phase: DrawPhase,
    wheel: Wheel,
    next_ticket: u64,
}

impl Default for DrawSequencer {
    fn default() -> Self {
        DrawSequencer {
            phase: DrawPhase::Idle,
            wheel: Wheel::default(),
            next_ticket: 1,
        }
    }
}

impl DrawSequencer {
    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DrawPhase::Idle
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    /// Starts a draw. Returns `None` while a previous draw is still running.
    pub fn activate(&mut self) -> Option<DrawTicket> {
        if !self.is_idle() {
            debug!(phase = ?self.phase, "draw already in progress; ignoring activation");
            return None;
        }
        let ticket = DrawTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = DrawPhase::Spinning { ticket };
        self.wheel.start();
        info!(ticket = ticket.0, "draw started");
        Some(ticket)
    }

    /// Feeds the draw result in. Success brakes onto the winning slot; any
    /// failure halts the wheel where it stands. Results for a ticket other
    /// than the one spinning are ignored.
    pub fn resolve(&mut self, resolution: DrawResolution) -> Option<Landing> {
        let DrawResolution { ticket, result } = resolution;
        if self.phase != (DrawPhase::Spinning { ticket }) {
            debug!(ticket = ticket.0, phase = ?self.phase, "stale draw result ignored");
            return None;
        }
        let (outcome, landing) = match result {
            Ok(award) => {
                let target = award.grid_index();
                info!(
                    ticket = ticket.0,
                    award_id = award.award_id,
                    award_index = award.award_index,
                    target,
                    "draw won"
                );
                let landing = self.wheel.stop_at(target);
                (DrawOutcome::Won(award), landing)
            }
            Err(err) => {
                error!(ticket = ticket.0, error = %err, "draw failed");
                let landing = self.wheel.halt();
                let message = err.user_message();
                (DrawOutcome::Failed { message }, landing)
            }
        };
        self.phase = DrawPhase::Settling { ticket, outcome };
        Some(landing)
    }

    /// Completes a draw once its landing resolved.
    pub fn settle(&mut self, ticket: DrawTicket) -> Option<DrawOutcome> {
        match std::mem::replace(&mut self.phase, DrawPhase::Idle) {
            DrawPhase::Settling {
                ticket: current,
                outcome,
            } if current == ticket => {
                debug!(ticket = ticket.0, "draw settled");
                Some(outcome)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// One animation frame. Returns whether the highlight moved.
    pub fn tick(&mut self) -> bool {
        self.wheel.tick()
    }
}
