//! Collision tests and penetration response
//!
//! Pairwise primitive tests, primitive-vs-mesh queries, and the sphere
//! push-back used to slide bodies off terrain and walls.

use glam::Vec3;

use super::geometry::{Capsule, CollisionShape, LineSegment, Sphere};
use super::mesh::{LineHit, MeshHandle, MeshQuery, SphereHits};

/// Closest point to `p` on the segment `a`-`b`
#[inline]
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Squared distance between segments `p1`-`q1` and `p2`-`q2`
pub fn segment_segment_distance_sq(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    const EPS: f32 = 1e-12;
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= EPS && e <= EPS {
        (0.0, 0.0)
    } else if a <= EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0 // Parallel: any s works, pick the start
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    (c1 - c2).length_squared()
}

/// Sphere vs sphere: centers no farther apart than the summed radii
#[inline]
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
    let reach = a.radius + b.radius;
    a.world_center().distance_squared(b.world_center()) <= reach * reach
}

/// Line segment vs sphere
#[inline]
pub fn line_sphere(line: &LineSegment, sphere: &Sphere) -> bool {
    let closest = closest_point_on_segment(line.world_start(), line.world_end(), sphere.world_center());
    closest.distance_squared(sphere.world_center()) <= sphere.radius * sphere.radius
}

#[inline]
pub fn sphere_line(sphere: &Sphere, line: &LineSegment) -> bool {
    line_sphere(line, sphere)
}

/// Capsule vs sphere
pub fn capsule_sphere(capsule: &Capsule, sphere: &Sphere) -> bool {
    let closest =
        closest_point_on_segment(capsule.world_start(), capsule.world_end(), sphere.world_center());
    let reach = capsule.radius + sphere.radius;
    closest.distance_squared(sphere.world_center()) <= reach * reach
}

/// Capsule vs line segment
pub fn capsule_line(capsule: &Capsule, line: &LineSegment) -> bool {
    segment_segment_distance_sq(
        capsule.world_start(),
        capsule.world_end(),
        line.world_start(),
        line.world_end(),
    ) <= capsule.radius * capsule.radius
}

/// Overlap test between two entity shapes
///
/// Returns `None` when the pair has no test (either side `None`, or
/// line/line and capsule/capsule which nothing in the game needs).
pub fn shapes_overlap(a: &CollisionShape, b: &CollisionShape) -> Option<bool> {
    use CollisionShape as S;
    match (a, b) {
        (S::Sphere(a), S::Sphere(b)) => Some(sphere_sphere(a, b)),
        (S::Line(l), S::Sphere(s)) | (S::Sphere(s), S::Line(l)) => Some(line_sphere(l, s)),
        (S::Capsule(c), S::Sphere(s)) | (S::Sphere(s), S::Capsule(c)) => Some(capsule_sphere(c, s)),
        (S::Capsule(c), S::Line(l)) | (S::Line(l), S::Capsule(c)) => Some(capsule_line(c, l)),
        _ => None,
    }
}

/// Sphere vs static mesh: every overlapping triangle
///
/// `hits.hit()` is the "any contact" flag. The result is released on drop.
pub fn sphere_mesh(sphere: &Sphere, meshes: &(impl MeshQuery + ?Sized), handle: MeshHandle) -> SphereHits {
    meshes.query_sphere(handle, sphere.world_center(), sphere.radius)
}

/// Line segment vs static mesh: nearest crossing
pub fn line_mesh(line: &LineSegment, meshes: &(impl MeshQuery + ?Sized), handle: MeshHandle) -> LineHit {
    meshes.query_line(handle, line.world_start(), line.world_end())
}

/// Displacement that pushes `sphere` out of the hit triangles
///
/// Triangles are handled one after another in query order, each correction
/// applied on top of the previous one. This is a single-pass sequential
/// approximation; several simultaneous contacts do not yield a minimal
/// translation. Each triangle is re-tested against the unmoved sphere before
/// it contributes.
pub fn sphere_push_back(sphere: &Sphere, hits: &SphereHits) -> Vec3 {
    let origin = sphere.world_center();
    let radius = sphere.radius;
    let mut candidate = origin;

    for tri in hits.triangles() {
        let normal = tri.normal();
        let dot = normal.dot(candidate - tri.positions[0]);
        let foot = candidate - normal * dot;
        let dist = (candidate - foot).length();

        if !tri.overlaps_sphere(origin, radius) {
            continue;
        }

        candidate += normal * (radius - dist);
    }

    candidate - origin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mesh::{Triangle, TriangleMesh};
    use proptest::prelude::*;

    fn sphere_at(center: Vec3, radius: f32) -> Sphere {
        let mut sphere = Sphere::new(Vec3::ZERO, radius);
        sphere.move_to(center);
        sphere
    }

    fn line_at(start: Vec3, end: Vec3) -> LineSegment {
        let mut line = LineSegment::new(start, end);
        line.move_to(Vec3::ZERO);
        line
    }

    #[test]
    fn test_sphere_sphere_touching_counts() {
        let a = sphere_at(Vec3::ZERO, 1.0);
        let b = sphere_at(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(sphere_sphere(&a, &b));

        let c = sphere_at(Vec3::new(2.1, 0.0, 0.0), 1.0);
        assert!(!sphere_sphere(&a, &c));
    }

    #[test]
    fn test_line_sphere() {
        let sphere = sphere_at(Vec3::new(0.0, 0.0, 0.0), 1.0);
        // Passes through
        assert!(line_sphere(&line_at(Vec3::new(-5.0, 0.5, 0.0), Vec3::new(5.0, 0.5, 0.0)), &sphere));
        // Misses sideways
        assert!(!line_sphere(&line_at(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(5.0, 2.0, 0.0)), &sphere));
        // Segment stops short even though the infinite line would hit
        let short = line_at(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0));
        assert!(!line_sphere(&short, &sphere));
        assert!(!sphere_line(&sphere, &short));
    }

    #[test]
    fn test_capsule_tests() {
        let mut capsule = Capsule::new(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0), 1.0);
        capsule.move_to(Vec3::ZERO);

        assert!(capsule_sphere(&capsule, &sphere_at(Vec3::new(1.5, 5.0, 0.0), 1.0)));
        assert!(!capsule_sphere(&capsule, &sphere_at(Vec3::new(3.0, 5.0, 0.0), 1.0)));

        let crossing = line_at(Vec3::new(-5.0, 5.0, 0.5), Vec3::new(5.0, 5.0, 0.5));
        assert!(capsule_line(&capsule, &crossing));
        let away = line_at(Vec3::new(-5.0, 5.0, 3.0), Vec3::new(5.0, 5.0, 3.0));
        assert!(!capsule_line(&capsule, &away));
    }

    #[test]
    fn test_segment_distance_parallel() {
        let d = segment_segment_distance_sq(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Y + Vec3::X);
        assert!((d - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shapes_overlap_dispatch() {
        let a = CollisionShape::Sphere(sphere_at(Vec3::ZERO, 1.0));
        let b = CollisionShape::Sphere(sphere_at(Vec3::new(1.0, 0.0, 0.0), 1.0));
        assert_eq!(shapes_overlap(&a, &b), Some(true));
        assert_eq!(shapes_overlap(&a, &CollisionShape::None), None);

        let line = CollisionShape::Line(line_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -5.0, 0.0)));
        assert_eq!(shapes_overlap(&line, &a), Some(true));
        assert_eq!(shapes_overlap(&line, &line), None);
    }

    #[test]
    fn test_sphere_mesh_reports_hits() {
        let mut library = crate::sim::mesh::MeshLibrary::new();
        library.register("floor", TriangleMesh::floor(100.0, 0.0));
        let handle = library.load("floor").unwrap();

        let hits = sphere_mesh(&sphere_at(Vec3::new(0.0, 5.0, 0.0), 8.0), &library, handle);
        assert!(hits.hit());
        assert_eq!(hits.len(), 2);

        let hits = sphere_mesh(&sphere_at(Vec3::new(0.0, 50.0, 0.0), 8.0), &library, handle);
        assert!(!hits.hit());

        let foot = line_at(Vec3::new(3.0, 20.0, 5.0), Vec3::new(3.0, -30.0, 5.0));
        let hit = line_mesh(&foot, &library, handle);
        assert!(hit.hit);
        assert!(hit.point.y.abs() < 1e-4);
    }

    #[test]
    fn test_push_back_single_triangle_depth() {
        let tri = Triangle::new(
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(-50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, 0.0),
        );
        let sphere = sphere_at(Vec3::new(0.0, 5.0, 0.0), 8.0);
        let hits = SphereHits::from(vec![tri]);

        let push = sphere_push_back(&sphere, &hits);
        assert!((push.length() - 3.0).abs() < 1e-4, "push {push:?}");
        assert!(push.normalize().abs_diff_eq(tri.normal(), 1e-5));
    }

    #[test]
    fn test_push_back_two_coplanar_triangles_not_doubled() {
        let floor = TriangleMesh::floor(100.0, 0.0);
        let sphere = sphere_at(Vec3::new(10.0, 2.0, 12.0), 8.0);
        let hits = floor.query_sphere(sphere.world_center(), sphere.radius);
        assert_eq!(hits.len(), 2);

        // Second triangle sees the already-corrected candidate
        let push = sphere_push_back(&sphere, &hits);
        assert!(push.abs_diff_eq(Vec3::new(0.0, 6.0, 0.0), 1e-4), "push {push:?}");
    }

    #[test]
    fn test_push_back_skips_non_overlapping() {
        let far = Triangle::new(
            Vec3::new(100.0, 0.0, 100.0),
            Vec3::new(100.0, 0.0, 110.0),
            Vec3::new(110.0, 0.0, 110.0),
        );
        let sphere = sphere_at(Vec3::new(0.0, 2.0, 0.0), 8.0);
        let push = sphere_push_back(&sphere, &SphereHits::from(vec![far]));
        assert_eq!(push, Vec3::ZERO);
    }

    #[test]
    fn test_push_back_is_order_dependent() {
        // Floor and a wall at x = 5 facing -X, sphere wedged in the corner
        let floor = Triangle::new(
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(-50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, 0.0),
        );
        let wall = Triangle::new(
            Vec3::new(5.0, -50.0, -50.0),
            Vec3::new(5.0, -50.0, 50.0),
            Vec3::new(5.0, 50.0, 0.0),
        );
        assert!(wall.normal().abs_diff_eq(Vec3::NEG_X, 1e-5));

        let sphere = sphere_at(Vec3::new(0.0, 4.0, 0.0), 8.0);
        let a = sphere_push_back(&sphere, &SphereHits::from(vec![floor, wall]));
        let b = sphere_push_back(&sphere, &SphereHits::from(vec![wall, floor]));
        // Orthogonal planes: both orders resolve each axis independently
        assert!(a.abs_diff_eq(Vec3::new(-3.0, 4.0, 0.0), 1e-4), "a {a:?}");
        assert!(a.abs_diff_eq(b, 1e-4));

        // A tilted second plane makes the result depend on processing order
        let ramp = Triangle::new(
            Vec3::new(-50.0, -50.0, -50.0),
            Vec3::new(-50.0, -50.0, 50.0),
            Vec3::new(50.0, 50.0, 0.0),
        );
        let c = sphere_push_back(&sphere, &SphereHits::from(vec![floor, ramp]));
        let d = sphere_push_back(&sphere, &SphereHits::from(vec![ramp, floor]));
        assert!(!c.abs_diff_eq(d, 1e-3), "c {c:?} d {d:?}");
    }

    proptest! {
        #[test]
        fn prop_sphere_sphere_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0, az in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0, bz in -100.0f32..100.0,
            ra in 0.0f32..50.0, rb in 0.0f32..50.0,
        ) {
            let a = sphere_at(Vec3::new(ax, ay, az), ra);
            let b = sphere_at(Vec3::new(bx, by, bz), rb);
            prop_assert_eq!(sphere_sphere(&a, &b), sphere_sphere(&b, &a));
        }

        #[test]
        fn prop_line_sphere_symmetric(
            sx in -50.0f32..50.0, sz in -50.0f32..50.0,
            ex in -50.0f32..50.0, ez in -50.0f32..50.0,
            cx in -50.0f32..50.0, cz in -50.0f32..50.0,
            r in 0.1f32..20.0,
        ) {
            let line = line_at(Vec3::new(sx, 0.0, sz), Vec3::new(ex, 0.0, ez));
            let sphere = sphere_at(Vec3::new(cx, 0.0, cz), r);
            prop_assert_eq!(line_sphere(&line, &sphere), sphere_line(&sphere, &line));
        }
    }
}
