//! Render surface the simulation draws into
//!
//! The simulation never reads anything back from rendering. `DrawList`
//! records commands for headless runs and tests.

use glam::Vec3;

use crate::sim::geometry::{Capsule, CollisionShape, LineSegment, Sphere};
use crate::sim::mesh::{MeshHandle, ModelTransform};

/// Sink for draw calls
pub trait RenderSurface {
    fn draw_model(&mut self, handle: MeshHandle, transform: ModelTransform);
    fn draw_sphere(&mut self, center: Vec3, radius: f32);
    fn draw_line(&mut self, start: Vec3, end: Vec3);
    fn draw_capsule(&mut self, start: Vec3, end: Vec3, radius: f32);

    /// Called once per frame before the world draws
    fn begin_frame(&mut self) {}
}

/// Draw a shape's world-space wireframe
pub fn draw_shape(surface: &mut dyn RenderSurface, shape: &CollisionShape) {
    match shape {
        CollisionShape::None => {}
        CollisionShape::Sphere(sphere) => draw_sphere(surface, sphere),
        CollisionShape::Line(line) => draw_segment(surface, line),
        CollisionShape::Capsule(capsule) => draw_capsule(surface, capsule),
    }
}

fn draw_sphere(surface: &mut dyn RenderSurface, sphere: &Sphere) {
    surface.draw_sphere(sphere.world_center(), sphere.radius);
}

pub fn draw_segment(surface: &mut dyn RenderSurface, line: &LineSegment) {
    surface.draw_line(line.world_start(), line.world_end());
}

fn draw_capsule(surface: &mut dyn RenderSurface, capsule: &Capsule) {
    surface.draw_capsule(capsule.world_start(), capsule.world_end(), capsule.radius);
}

/// One recorded draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Model { handle: MeshHandle, transform: ModelTransform },
    Sphere { center: Vec3, radius: f32 },
    Line { start: Vec3, end: Vec3 },
    Capsule { start: Vec3, end: Vec3, radius: f32 },
}

/// Surface that records every call in order
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of model draws recorded
    pub fn model_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Model { .. }))
            .count()
    }
}

impl RenderSurface for DrawList {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw_model(&mut self, handle: MeshHandle, transform: ModelTransform) {
        self.commands.push(DrawCommand::Model { handle, transform });
    }

    fn draw_sphere(&mut self, center: Vec3, radius: f32) {
        self.commands.push(DrawCommand::Sphere { center, radius });
    }

    fn draw_line(&mut self, start: Vec3, end: Vec3) {
        self.commands.push(DrawCommand::Line { start, end });
    }

    fn draw_capsule(&mut self, start: Vec3, end: Vec3, radius: f32) {
        self.commands.push(DrawCommand::Capsule { start, end, radius });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_shape_uses_world_space() {
        let mut sphere = Sphere::new(Vec3::Y, 2.0);
        sphere.move_to(Vec3::X);
        let mut list = DrawList::new();
        draw_shape(&mut list, &CollisionShape::Sphere(sphere));
        draw_shape(&mut list, &CollisionShape::None);

        assert_eq!(
            list.commands,
            vec![DrawCommand::Sphere {
                center: Vec3::new(1.0, 1.0, 0.0),
                radius: 2.0
            }]
        );
    }

    #[test]
    fn test_capsule_and_line_commands() {
        let mut list = DrawList::new();
        let mut capsule = Capsule::new(Vec3::ZERO, Vec3::Y, 0.5);
        capsule.move_to(Vec3::Z);
        draw_shape(&mut list, &CollisionShape::Capsule(capsule));
        draw_shape(&mut list, &CollisionShape::Line(LineSegment::new(Vec3::ZERO, Vec3::X)));

        assert_eq!(list.commands.len(), 2);
        assert!(matches!(list.commands[0], DrawCommand::Capsule { radius, .. } if radius == 0.5));
        assert_eq!(list.model_count(), 0);
    }
}
