//! Spin animation for the award ring.
//!
//! The highlight walks the eight ring cells one step per tick. Stopping hands
//! back a [`Landing`] future that resolves once the highlight comes to rest.

use crate::award_grid::RING_LEN;
use std::{
    future::Future,
    pin::Pin,
    task::{
        Context,
        Poll,
    },
};
use tokio::sync::oneshot;

/// Full laps run after a stop is commanded, before braking ends on target.
pub const MIN_EXTRA_LAPS: usize = 1;
/// Braking starts this many steps before the target.
pub const BRAKE_WINDOW: usize = 6;
pub const MAX_BRAKE_DELAY: u32 = 4;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Motion {
    Resting,
    Spinning,
    Braking { remaining: usize, wait: u32 },
}

#[derive(Debug)]
pub struct Wheel {
    position: usize,
    motion: Motion,
    landing: Option<oneshot::Sender<usize>>,
}

impl Default for Wheel {
    fn default() -> Self {
        Wheel {
            position: 0,
            motion: Motion::Resting,
            landing: None,
        }
    }
}

/// Resolves with the index the wheel came to rest on, or `None` if the
/// wheel was dropped or re-commanded before landing.
#[derive(Debug)]
pub struct Landing {
    rx: oneshot::Receiver<usize>,
}

impl Future for Landing {
    type Output = Option<usize>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

impl Wheel {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_resting(&self) -> bool {
        self.motion == Motion::Resting
    }

    pub fn start(&mut self) {
        if self.motion == Motion::Resting {
            self.motion = Motion::Spinning;
        }
    }

    /// Decelerates onto `target` after at least one more full lap.
    pub fn stop_at(&mut self, target: usize) -> Landing {
        let target = target % RING_LEN;
        let ahead = (target + RING_LEN - self.position) % RING_LEN;
        let remaining = RING_LEN * MIN_EXTRA_LAPS + ahead;
        self.motion = Motion::Braking {
            remaining,
            wait: braking_delay(remaining),
        };
        self.arm_landing()
    }

    /// Stops on the spot. The returned landing is already resolved.
    pub fn halt(&mut self) -> Landing {
        self.motion = Motion::Resting;
        let landing = self.arm_landing();
        self.fire_landing();
        landing
    }

    /// Advances the animation by one frame. Returns whether the highlight
    /// moved.
    pub fn tick(&mut self) -> bool {
        match &mut self.motion {
            Motion::Resting => false,
            Motion::Spinning => {
                self.advance();
                true
            }
            Motion::Braking { remaining, wait } => {
                if *wait > 0 {
                    *wait -= 1;
                    return false;
                }
                *remaining -= 1;
                let left = *remaining;
                if left == 0 {
                    self.motion = Motion::Resting;
                } else {
                    *wait = braking_delay(left);
                }
                self.advance();
                if left == 0 {
                    self.fire_landing();
                }
                true
            }
        }
    }

    fn advance(&mut self) {
        self.position = (self.position + 1) % RING_LEN;
    }

    fn arm_landing(&mut self) -> Landing {
        let (tx, rx) = oneshot::channel();
        self.landing = Some(tx);
        Landing { rx }
    }

    fn fire_landing(&mut self) {
        if let Some(tx) = self.landing.take() {
            let _ = tx.send(self.position);
        }
    }
}

fn braking_delay(remaining: usize) -> u32 {
    if remaining >= BRAKE_WINDOW {
        0
    } else {
        ((BRAKE_WINDOW - remaining) as u32).min(MAX_BRAKE_DELAY)
    }
}
