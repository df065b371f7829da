//! Decoration only: the counting-up paid total and the confetti burst.
//!
//! Nothing here feeds back into the payment data. The UI talks to it through
//! [`Effects`] so the randomness and frame timing can be swapped out.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use schedule::Amount;

use crate::term::style::CONFETTI;

/// Frames per second the event loop ticks at while something is animating.
pub const FPS: u32 = 60;

const COUNTER_FRAMES: u32 = FPS;
const PARTICLES: usize = 50;

/// Paces animation frames by wall-clock time, independent of how many input
/// events arrive in between.
pub struct Ticker {
    frame: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(now: Instant) -> Self {
        Self {
            frame: Duration::from_secs(1) / FPS,
            last: now,
        }
    }

    /// Starts counting frames from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Time left until the next frame is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.frame.saturating_sub(now.saturating_duration_since(self.last))
    }

    /// Number of frames that became due since the last call.
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut frames = 0;
        while now.saturating_duration_since(self.last) >= self.frame {
            self.last += self.frame;
            frames += 1;
        }
        frames
    }
}

pub trait Effects {
    /// A month was just marked as paid.
    fn celebrate(&mut self);

    /// Counts the displayed paid total up to `amount`.
    fn show_paid(&mut self, amount: Amount);

    fn displayed_paid(&self) -> Amount;

    fn tick(&mut self);

    fn is_animating(&self) -> bool;

    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Shows final values straight away and never draws anything.
#[derive(Default)]
pub struct NoEffects {
    paid: Amount,
}

impl Effects for NoEffects {
    fn celebrate(&mut self) {}

    fn show_paid(&mut self, amount: Amount) {
        self.paid = amount;
    }

    fn displayed_paid(&self) -> Amount {
        self.paid
    }

    fn tick(&mut self) {}

    fn is_animating(&self) -> bool {
        false
    }

    fn render(&self, _: Rect, _: &mut Buffer) {}
}

struct Counter {
    target: Amount,
    frame: u32,
}

impl Counter {
    fn value(&self) -> Amount {
        let target = self.target.into_inner();
        Amount::from(target * u64::from(self.frame) / u64::from(COUNTER_FRAMES))
    }

    fn done(&self) -> bool {
        self.frame >= COUNTER_FRAMES
    }
}

struct Particle {
    /// Final offset from the centre, as a fraction of the area.
    dest_x: f32,
    dest_y: f32,
    frame: u32,
    frames: u32,
    color: ratatui::style::Color,
    symbol: &'static str,
}

impl Particle {
    fn progress(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let p = self.frame as f32 / self.frames as f32;
        // Fast start, slow finish.
        1.0 - (1.0 - p).powi(3)
    }
}

pub struct Decorations<R> {
    rng: R,
    counter: Counter,
    particles: Vec<Particle>,
}

impl<R: Rng> Decorations<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            counter: Counter {
                target: Amount::default(),
                frame: COUNTER_FRAMES,
            },
            particles: Vec::new(),
        }
    }
}

impl<R: Rng> Effects for Decorations<R> {
    fn celebrate(&mut self) {
        let rng = &mut self.rng;
        self.particles.extend((0..PARTICLES).map(|_| Particle {
            dest_x: rng.gen_range(-0.5..0.5),
            dest_y: rng.gen_range(-0.5..0.5),
            frame: 0,
            frames: rng.gen_range(FPS..FPS * 3 / 2),
            color: *CONFETTI.choose(rng).unwrap_or(&CONFETTI[0]),
            symbol: ["■", "●", "▲", "✦"].choose(rng).copied().unwrap_or("■"),
        }));
    }

    fn show_paid(&mut self, amount: Amount) {
        self.counter = Counter {
            target: amount,
            frame: 0,
        };
    }

    fn displayed_paid(&self) -> Amount {
        self.counter.value()
    }

    fn tick(&mut self) {
        if !self.counter.done() {
            self.counter.frame += 1;
        }
        for particle in &mut self.particles {
            particle.frame += 1;
        }
        self.particles.retain(|p| p.frame < p.frames);
    }

    fn is_animating(&self) -> bool {
        !self.counter.done() || !self.particles.is_empty()
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let center_x = f32::from(area.x) + f32::from(area.width) / 2.0;
        let center_y = f32::from(area.y) + f32::from(area.height) / 2.0;
        for particle in &self.particles {
            let progress = particle.progress();
            let x = center_x + particle.dest_x * f32::from(area.width) * progress;
            let y = center_y + particle.dest_y * f32::from(area.height) * progress;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (x.floor() as u16, y.floor() as u16);
            if !area.contains((x, y).into()) {
                continue;
            }
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(particle.symbol).set_fg(particle.color);
            }
        }
    }
}
