//! Collision primitives in body-local and world frames
//!
//! Every shape stores its local offsets once and derives the world-space
//! fields from them. `move_to` is the only writer of world fields: it must be
//! called after the owner's position is final for the tick and before any
//! query uses the shape. Shapes never point back at their owner.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A sphere attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center relative to the owner's position
    pub local_center: Vec3,
    pub radius: f32,
    /// Center in world space (local_center + owner position)
    world_center: Vec3,
}

impl Sphere {
    pub fn new(local_center: Vec3, radius: f32) -> Self {
        Self {
            local_center,
            radius,
            world_center: local_center,
        }
    }

    /// Recompute world fields for an owner at `pos`
    #[inline]
    pub fn move_to(&mut self, pos: Vec3) {
        self.world_center = self.local_center + pos;
    }

    #[inline]
    pub fn world_center(&self) -> Vec3 {
        self.world_center
    }
}

/// A line segment attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub local_start: Vec3,
    pub local_end: Vec3,
    world_start: Vec3,
    world_end: Vec3,
}

impl LineSegment {
    pub fn new(local_start: Vec3, local_end: Vec3) -> Self {
        Self {
            local_start,
            local_end,
            world_start: local_start,
            world_end: local_end,
        }
    }

    /// Recompute world fields for an owner at `pos`
    #[inline]
    pub fn move_to(&mut self, pos: Vec3) {
        self.world_start = self.local_start + pos;
        self.world_end = self.local_end + pos;
    }

    #[inline]
    pub fn world_start(&self) -> Vec3 {
        self.world_start
    }

    #[inline]
    pub fn world_end(&self) -> Vec3 {
        self.world_end
    }
}

/// A capsule (swept sphere) attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub local_start: Vec3,
    pub local_end: Vec3,
    pub radius: f32,
    world_start: Vec3,
    world_end: Vec3,
}

impl Capsule {
    pub fn new(local_start: Vec3, local_end: Vec3, radius: f32) -> Self {
        Self {
            local_start,
            local_end,
            radius,
            world_start: local_start,
            world_end: local_end,
        }
    }

    /// Recompute world fields for an owner at `pos`
    #[inline]
    pub fn move_to(&mut self, pos: Vec3) {
        self.world_start = self.local_start + pos;
        self.world_end = self.local_end + pos;
    }

    #[inline]
    pub fn world_start(&self) -> Vec3 {
        self.world_start
    }

    #[inline]
    pub fn world_end(&self) -> Vec3 {
        self.world_end
    }
}

/// The single collision shape an entity carries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CollisionShape {
    #[default]
    None,
    Sphere(Sphere),
    Line(LineSegment),
    Capsule(Capsule),
}

impl CollisionShape {
    /// Recompute world fields for an owner at `pos`
    pub fn move_to(&mut self, pos: Vec3) {
        match self {
            CollisionShape::None => {}
            CollisionShape::Sphere(sphere) => sphere.move_to(pos),
            CollisionShape::Line(line) => line.move_to(pos),
            CollisionShape::Capsule(capsule) => capsule.move_to(pos),
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            CollisionShape::Sphere(sphere) => Some(sphere),
            _ => None,
        }
    }
}
