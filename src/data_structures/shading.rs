//! CPU mirrors of the per-vertex and per-fragment math in the WGSL shaders.
//!
//! The shaders are the source of truth for what ends up on screen; these
//! functions repeat the same arithmetic so the scrolling behaviour can be
//! reasoned about (and asserted on) without a GPU.

/// Size of one grid cell in world units (the shader divides by this step).
pub const GRID_STEP: f32 = 2.0;

/// GLSL/WGSL style `fract`: always in `[0, 1)`, also for negative input.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Floored modulus, matching the shader's `x - y * floor(x / y)`.
pub fn modulo(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Grid-line intensity at a ground position, as computed by `grid.wgsl`.
///
/// `0.0` is the centre of a line, `1.0` is open floor. `fwidth` is the
/// screen-space derivative of the grid coordinate; the shader gets it from
/// the hardware, callers here pass it in.
pub fn grid_line(x: f32, z: f32, time: f32, speed: f32, fwidth: [f32; 2]) -> f32 {
    let coord_x = x / GRID_STEP;
    let coord_y = z / GRID_STEP - time * speed / 2.0;
    let distance = |c: f32| (fract(c - 0.5) - 0.5).abs();
    let gx = distance(coord_x) / fwidth[0];
    let gy = distance(coord_y) / fwidth[1];
    gx.min(gy).min(1.0)
}

/// Vertical ripple added to ground vertices.
pub fn ripple(x: f32, time: f32) -> f32 {
    0.1 * (x * 5.0 + time * 3.0).sin()
}

/// Travel-axis position of an instance after the looping scroll of `scroll.wgsl`.
///
/// The result always lies in `[-offset, span - offset)`, so instances never
/// drift away no matter how much time passes.
pub fn wrap_travel(z: f32, time: f32, speed: f32, span: f32, offset: f32) -> f32 {
    modulo(z + time * speed, span) - offset
}
