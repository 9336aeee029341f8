use std::collections::VecDeque;

use engine::{BlendMode, DrawSurface, PixelRect, Rgba, Vec2};
use rand::Rng;

/// Spawn parameters for radial, shrinking circle particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CircleBurst {
    pub(crate) radius: f32,
    pub(crate) speed: f32,
    /// Degrees, sampled uniformly; +y points down the screen.
    pub(crate) angle_range: (f32, f32),
    pub(crate) acceleration: Vec2,
    pub(crate) color: Rgba,
    /// 0 draws a filled disc, anything else a ring of that many pixels.
    pub(crate) width: u32,
    pub(crate) radius_decay: f32,
}

impl Default for CircleBurst {
    fn default() -> Self {
        Self {
            radius: 8.0,
            speed: 2.0,
            angle_range: (0.0, 360.0),
            acceleration: Vec2::new(0.0, 0.01),
            color: [255, 255, 255, 255],
            width: 0,
            radius_decay: 0.1,
        }
    }
}

impl CircleBurst {
    pub(crate) const COIN_PICKUP: CircleBurst = CircleBurst {
        radius: 16.0,
        speed: 2.0,
        angle_range: (0.0, 360.0),
        acceleration: Vec2::new(0.0, 0.01),
        color: [255, 175, 0, 255],
        width: 0,
        radius_decay: 0.5,
    };

    pub(crate) fn spawn<R: Rng + ?Sized>(&self, pos: Vec2, rng: &mut R) -> Particle {
        let (low, high) = self.angle_range;
        let angle = if high > low {
            rng.random_range(low..=high)
        } else {
            low
        };
        self.spawn_at_angle(pos, angle)
    }

    pub(crate) fn spawn_at_angle(&self, pos: Vec2, angle_degrees: f32) -> Particle {
        Particle::Circle(CircleParticle {
            pos,
            vel: Vec2::from_polar(self.speed, angle_degrees),
            acceleration: self.acceleration,
            radius: self.radius,
            radius_decay: self.radius_decay,
            color: self.color,
            width: self.width,
        })
    }
}

/// Direction for landing dust: upward hemisphere, biased towards the ground
/// on either side.
pub(crate) fn dust_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u: f32 = rng.random_range(-1.0..=1.0);
    let skewed = u.signum() * u.abs().sqrt();
    (skewed - 1.0) * 90.0
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CircleParticle {
    pos: Vec2,
    vel: Vec2,
    acceleration: Vec2,
    radius: f32,
    radius_decay: f32,
    color: Rgba,
    width: u32,
}

const FIREFLY_GLOW_RADIUS: f32 = 64.0;
const FIREFLY_GLOW_COLOR: Rgba = [32, 16, 0, 255];
const FIREFLY_CORE_HALF: f32 = 4.0;
const FIREFLY_CORE_COLOR: Rgba = [255, 191, 31, 255];
const FIREFLY_NUDGE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Firefly {
    pos: Vec2,
    vel: Vec2,
}

impl Firefly {
    pub(crate) fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Particle {
    Circle(CircleParticle),
    Firefly(Firefly),
}

impl Particle {
    #[cfg(test)]
    pub(crate) fn pos(&self) -> Vec2 {
        match self {
            Particle::Circle(circle) => circle.pos,
            Particle::Firefly(firefly) => firefly.pos,
        }
    }

    /// Remaining radius for circles; fireflies have no decaying strength.
    #[cfg(test)]
    pub(crate) fn strength(&self) -> Option<f32> {
        match self {
            Particle::Circle(circle) => Some(circle.radius),
            Particle::Firefly(_) => None,
        }
    }

    pub(crate) fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            Particle::Circle(circle) => {
                circle.vel += circle.acceleration;
                circle.pos += circle.vel;
                circle.radius -= circle.radius_decay;
            }
            Particle::Firefly(firefly) => {
                firefly.vel.x += rng.random_range(-1i32..=1) as f32 * FIREFLY_NUDGE;
                firefly.vel.y += rng.random_range(-1i32..=1) as f32 * FIREFLY_NUDGE;
                firefly.pos += firefly.vel;
            }
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        match self {
            Particle::Circle(circle) => circle.radius <= 0.0,
            Particle::Firefly(_) => false,
        }
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, scroll: Vec2) {
        match self {
            Particle::Circle(circle) => {
                if self.is_expired() {
                    return;
                }
                let center = circle.pos - scroll;
                if circle.width == 0 {
                    surface.fill_circle(center, circle.radius, circle.color, BlendMode::Normal);
                } else {
                    surface.stroke_circle(center, circle.radius, circle.width as f32, circle.color);
                }
            }
            Particle::Firefly(firefly) => {
                let center = firefly.pos - scroll;
                surface.fill_circle(
                    center,
                    FIREFLY_GLOW_RADIUS,
                    FIREFLY_GLOW_COLOR,
                    BlendMode::Additive,
                );
                let core = (FIREFLY_CORE_HALF * 2.0) as i32;
                surface.fill_rect(
                    PixelRect::new(
                        (center.x - FIREFLY_CORE_HALF).round() as i32,
                        (center.y - FIREFLY_CORE_HALF).round() as i32,
                        core,
                        core,
                    ),
                    FIREFLY_CORE_COLOR,
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Eviction {
    /// Drop expired particles from the front, stopping at the first live one.
    ExpiredFront,
    Never,
}

/// Particles of one behaviour, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParticleGroup {
    eviction: Eviction,
    particles: VecDeque<Particle>,
}

impl ParticleGroup {
    pub(crate) fn bursts() -> Self {
        Self::with_eviction(Eviction::ExpiredFront)
    }

    pub(crate) fn fireflies() -> Self {
        Self::with_eviction(Eviction::Never)
    }

    fn with_eviction(eviction: Eviction) -> Self {
        Self {
            eviction,
            particles: VecDeque::new(),
        }
    }

    pub(crate) fn add(&mut self, particle: Particle) {
        self.particles.push_back(particle);
    }

    pub(crate) fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub(crate) fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for particle in &mut self.particles {
            particle.update(rng);
        }
        if self.eviction == Eviction::ExpiredFront {
            while self.particles.front().is_some_and(Particle::is_expired) {
                self.particles.pop_front();
            }
        }
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, scroll: Vec2) {
        for particle in &self.particles {
            particle.draw(surface, scroll);
        }
    }
}

impl Extend<Particle> for ParticleGroup {
    fn extend<I: IntoIterator<Item = Particle>>(&mut self, iter: I) {
        self.particles.extend(iter);
    }
}
