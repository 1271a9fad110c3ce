use synthwave::data_structures::shading::{GRID_STEP, grid_line, ripple, wrap_travel};

const FWIDTH: [f32; 2] = [0.05, 0.05];

#[test]
fn grid_repeats_every_cell() {
    for i in 0..20 {
        let x = 0.37 + i as f32 * 0.11;
        let z = -3.3 + i as f32 * 0.7;
        let here = grid_line(x, z, 0.0, 10.0, FWIDTH);
        let next = grid_line(x + GRID_STEP, z + GRID_STEP, 0.0, 10.0, FWIDTH);
        assert!((here - next).abs() < 1e-3, "{here} vs {next} at ({x}, {z})");
    }
}

#[test]
fn grid_scrolls_by_time_times_speed() {
    // after one second at speed 10 the pattern has moved 10 units along z
    for i in 0..20 {
        let x = 0.9 + i as f32 * 0.05;
        let z = -7.0 + i as f32 * 0.3;
        let before = grid_line(x, z, 0.0, 10.0, FWIDTH);
        let after = grid_line(x, z + 10.0, 1.0, 10.0, FWIDTH);
        assert!((before - after).abs() < 1e-3);
    }
}

#[test]
fn ripple_is_small() {
    for i in 0..50 {
        assert!(ripple(i as f32 * 0.3, i as f32 * 0.1).abs() <= 0.1 + 1e-6);
    }
}

#[test]
fn palm_loop_wraps_back_in_front_of_the_camera() {
    // a tree that scrolled past the camera reappears at the far end
    let span = 1250.0;
    let offset = 1100.0;
    let just_before = wrap_travel(-100.0, 89.9, 15.0, span, offset);
    let just_after = wrap_travel(-100.0, 90.1, 15.0, span, offset);
    assert!(just_before > 140.0);
    assert!(just_after < -1090.0);
}
