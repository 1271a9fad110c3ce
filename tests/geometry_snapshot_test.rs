use synthwave::{
    placement::{AntiRepeat, Placement},
    scene::{ground, palm_trees, pyramids, road},
};

use crate::common::test_utils::{mesh, seeded_scene};

mod common;

fn assert_positions(actual: &[[f32; 3]], expected: &[[f32; 3]]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        for axis in 0..3 {
            assert!(
                (a[axis] - e[axis]).abs() < 1e-3,
                "vertex {i}: got {a:?}, expected {e:?}"
            );
        }
    }
}

#[test]
fn kerbs_are_laid_flat_then_stood_up() {
    let sidewalk = ground::sidewalk_geometry();
    assert_eq!(sidewalk.vertex_count(), 16);

    // translate (0.06, 110, 6), rotate_x(-π/2), rotate_z(0.49π)
    assert_positions(
        &sidewalk.positions[4..8],
        &[
            [-6.003, -0.0014, -260.0],
            [-5.9873, 0.4983, -260.0],
            [-6.003, -0.0014, 40.0],
            [-5.9873, 0.4983, 40.0],
        ],
    );
    // translate (0.44, 110, -6), same rotations
    assert_positions(
        &sidewalk.positions[12..16],
        &[
            [6.003, 0.0014, -260.0],
            [6.0187, 0.5012, -260.0],
            [6.003, 0.0014, 40.0],
            [6.0187, 0.5012, 40.0],
        ],
    );
}

#[test]
fn road_lines_are_four_flat_strips() {
    let lines = road::road_lines_geometry();
    assert_eq!(
        lines.indices,
        vec![
            0, 2, 1, 2, 3, 1, //
            4, 6, 5, 6, 7, 5, //
            8, 10, 9, 10, 11, 9, //
            12, 14, 13, 14, 15, 13,
        ]
    );
    // outer left line: 0.35 wide around x = -5.2, lifted 0.2
    assert_positions(
        &lines.positions[0..4],
        &[
            [-5.375, 0.2, -260.0],
            [-5.025, 0.2, -260.0],
            [-5.375, 0.2, 40.0],
            [-5.025, 0.2, 40.0],
        ],
    );
    // inner right line: 0.15 wide around x = 1.8
    assert_positions(
        &lines.positions[12..16],
        &[
            [1.725, 0.2, -260.0],
            [1.875, 0.2, -260.0],
            [1.725, 0.2, 40.0],
            [1.875, 0.2, 40.0],
        ],
    );
}

#[test]
fn road_surface_is_a_single_quad() {
    let road = road::road_geometry();
    assert_eq!(road.indices, vec![0, 2, 1, 2, 3, 1]);
    assert_positions(
        &road.positions,
        &[
            [-6.0, 0.1, -260.0],
            [6.0, 0.1, -260.0],
            [-6.0, 0.1, 40.0],
            [6.0, 0.1, 40.0],
        ],
    );
    assert_eq!(ground::floor_geometry().triangle_count(), 2);
}

#[test]
fn road_runs_away_from_the_camera() {
    let road = road::road_geometry();
    let zs: Vec<f32> = road.positions.iter().map(|p| p[2]).collect();
    let near = zs.iter().cloned().fold(f32::MIN, f32::max);
    let far = zs.iter().cloned().fold(f32::MAX, f32::min);
    assert!((near - (-110.0 + 150.0)).abs() < 1e-3, "near end at {near}");
    assert!((far - (-110.0 - 150.0)).abs() < 1e-3, "far end at {far}");
}

#[test]
fn same_seed_same_layout() {
    let a = seeded_scene(99);
    let b = seeded_scene(99);
    assert_eq!(mesh(&a, "palmTree").geometry, mesh(&b, "palmTree").geometry);
    assert_eq!(mesh(&a, "palmTree").instances, mesh(&b, "palmTree").instances);
    assert_eq!(mesh(&a, "pyramidField").geometry, mesh(&b, "pyramidField").geometry);
}

#[test]
fn palm_rows_have_four_trees_each() {
    let mut placement = Placement::seeded(8, AntiRepeat::PerCall);
    let offsets = palm_trees::offsets(&mut placement, palm_trees::ROWS);
    assert_eq!(offsets.len(), 4 * palm_trees::ROWS);
}

#[test]
fn composite_meshes_have_the_expected_size() {
    let scene = seeded_scene(10);
    let palm = mesh(&scene, "palmTree");
    assert_eq!(palm.geometry.vertex_count(), 240);
    assert_eq!(palm.instance_count(), 160);

    let field = mesh(&scene, "pyramidField");
    assert_eq!(field.geometry.vertex_count(), pyramids::COUNT * 10);
    assert_eq!(field.instance_count(), pyramids::REPEATS.len());
}
