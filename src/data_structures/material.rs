//! Materials and their typed uniform schemas.
//!
//! A [`Material`] pairs a [`ShaderProgram`] with the current value of every
//! uniform that program declares. Each program owns a static schema (uniform
//! → type + default) that is the single source of truth for
//!
//! - which uniforms may be set on a material of that program,
//! - what type each of them has,
//! - the byte layout of the uniform buffer the WGSL struct reads.
//!
//! The WGSL structs in `src/pipelines/*.wgsl` declare their fields in schema
//! order. [`Material::pack`] follows WGSL uniform layout rules (`vec3<f32>`
//! aligned to 16 bytes, struct size rounded up to 16) so the bytes can be
//! written straight into the buffer.

use std::sync::Arc;

use anyhow::{anyhow, bail};

/// Every uniform name a shader program may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uniform {
    Color,
    Opacity,
    Ambient,
    Time,
    Speed,
    /// Length of the travel-axis loop of instanced elements.
    Span,
    /// Shift applied after wrapping so the loop sits in front of and behind the camera.
    Offset,
    Scale,
    StretchX,
    StretchY,
    EmissiveIntensity,
}

impl Uniform {
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Color => "color",
            Uniform::Opacity => "opacity",
            Uniform::Ambient => "ambient",
            Uniform::Time => "time",
            Uniform::Speed => "speed",
            Uniform::Span => "span",
            Uniform::Offset => "offset",
            Uniform::Scale => "scale",
            Uniform::StretchX => "stretch_x",
            Uniform::StretchY => "stretch_y",
            Uniform::EmissiveIntensity => "emissive_intensity",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformType {
    Float,
    /// A linear RGB colour, laid out as `vec3<f32>`.
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Color([f32; 3]),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Color(_) => UniformType::Color,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            UniformValue::Color(_) => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        UniformValue::Color(value)
    }
}

/// One entry of a program's uniform schema.
#[derive(Clone, Copy, Debug)]
pub struct UniformDecl {
    pub uniform: Uniform,
    pub ty: UniformType,
    pub default: UniformValue,
}

const fn float(uniform: Uniform, default: f32) -> UniformDecl {
    UniformDecl {
        uniform,
        ty: UniformType::Float,
        default: UniformValue::Float(default),
    }
}

const fn color(uniform: Uniform) -> UniformDecl {
    UniformDecl {
        uniform,
        ty: UniformType::Color,
        default: UniformValue::Color([1.0, 1.0, 1.0]),
    }
}

const STANDARD_SCHEMA: &[UniformDecl] = &[
    color(Uniform::Color),
    float(Uniform::Opacity, 1.0),
    float(Uniform::Ambient, 1.0),
];

const TEXTURED_SCHEMA: &[UniformDecl] = &[color(Uniform::Color), float(Uniform::Opacity, 1.0)];

const GRID_SCHEMA: &[UniformDecl] = &[
    color(Uniform::Color),
    float(Uniform::Time, 0.0),
    float(Uniform::Speed, 10.0),
    float(Uniform::Opacity, 1.0),
];

const SCROLL_SCHEMA: &[UniformDecl] = &[
    color(Uniform::Color),
    float(Uniform::Time, 0.0),
    float(Uniform::Speed, 15.0),
    float(Uniform::Span, 950.0),
    float(Uniform::Offset, 800.0),
    float(Uniform::Scale, 1.0),
    float(Uniform::StretchY, 1.0),
    float(Uniform::StretchX, 1.0),
    float(Uniform::EmissiveIntensity, 3.5),
];

/// The closed set of shader programs the renderer knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Flat colour lit by the ambient term.
    Standard,
    /// Unlit texture lookup.
    Textured,
    /// Rippling ground with the scrolling grid pattern.
    Grid,
    /// Instanced emissive geometry that loops along the travel axis.
    Scroll,
}

impl ShaderProgram {
    pub fn schema(self) -> &'static [UniformDecl] {
        match self {
            ShaderProgram::Standard => STANDARD_SCHEMA,
            ShaderProgram::Textured => TEXTURED_SCHEMA,
            ShaderProgram::Grid => GRID_SCHEMA,
            ShaderProgram::Scroll => SCROLL_SCHEMA,
        }
    }

    /// Size in bytes of the packed uniform struct.
    pub fn uniform_size(self) -> usize {
        layout(self.schema()).1 * 4
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Double,
}

/// A shader program plus the current value of each of its uniforms.
#[derive(Clone, Debug)]
pub struct Material {
    program: ShaderProgram,
    values: Vec<UniformValue>,
    pub side: Side,
    pub transparent: bool,
    pub depth_write: bool,
    pub wireframe: bool,
    pub texture: Option<Arc<image::RgbaImage>>,
}

impl Material {
    pub fn new(program: ShaderProgram) -> Self {
        Self {
            program,
            values: program.schema().iter().map(|decl| decl.default).collect(),
            side: Side::Front,
            transparent: false,
            depth_write: true,
            wireframe: false,
            texture: None,
        }
    }

    pub fn program(&self) -> ShaderProgram {
        self.program
    }

    fn slot(&self, uniform: Uniform) -> Option<usize> {
        self.program
            .schema()
            .iter()
            .position(|decl| decl.uniform == uniform)
    }

    /// Sets a uniform, checking it against the program's schema.
    pub fn set(&mut self, uniform: Uniform, value: impl Into<UniformValue>) -> anyhow::Result<()> {
        let value = value.into();
        let slot = self.slot(uniform).ok_or_else(|| {
            anyhow!(
                "{:?} shader has no uniform `{}`",
                self.program,
                uniform.name()
            )
        })?;
        let expected = self.program.schema()[slot].ty;
        if value.ty() != expected {
            bail!(
                "uniform `{}` is {:?}, got {:?}",
                uniform.name(),
                expected,
                value.ty()
            );
        }
        self.values[slot] = value;
        Ok(())
    }

    /// Builder form of [`set`](Self::set). Schema violations are logged and
    /// leave the default in place.
    pub fn with(mut self, uniform: Uniform, value: impl Into<UniformValue>) -> Self {
        if let Err(e) = self.set(uniform, value) {
            log::warn!("ignoring uniform: {e}");
        }
        self
    }

    pub fn get(&self, uniform: Uniform) -> Option<UniformValue> {
        self.slot(uniform).map(|slot| self.values[slot])
    }

    pub fn float(&self, uniform: Uniform) -> Option<f32> {
        self.get(uniform).and_then(|value| value.as_float())
    }

    pub fn time(&self) -> Option<f32> {
        self.float(Uniform::Time)
    }

    /// Whether the program declares a time uniform that the animation driver advances.
    pub fn is_animated(&self) -> bool {
        self.slot(Uniform::Time).is_some()
    }

    /// Writes the time uniform. Returns `false` for programs without one.
    pub fn set_time(&mut self, time: f32) -> bool {
        match self.slot(Uniform::Time) {
            Some(slot) => {
                self.values[slot] = UniformValue::Float(time);
                true
            }
            None => false,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn with_wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    /// Disables depth writes, so later draws are not hidden behind this one.
    pub fn without_depth_write(mut self) -> Self {
        self.depth_write = false;
        self
    }

    pub fn with_texture(mut self, texture: Arc<image::RgbaImage>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn transparent(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.with(Uniform::Opacity, opacity)
    }

    /// Packs the uniform values into the WGSL uniform-buffer layout.
    pub fn pack(&self) -> Vec<u8> {
        let (offsets, len) = layout(self.program.schema());
        let mut words = vec![0f32; len];
        for (value, offset) in self.values.iter().zip(offsets) {
            match value {
                UniformValue::Float(v) => words[offset] = *v,
                UniformValue::Color(c) => words[offset..offset + 3].copy_from_slice(c),
            }
        }
        bytemuck::cast_slice(&words).to_vec()
    }
}

/// Word offsets of each schema entry and the total struct length in words.
fn layout(schema: &[UniformDecl]) -> (Vec<usize>, usize) {
    let mut cursor: usize = 0;
    let offsets = schema
        .iter()
        .map(|decl| match decl.ty {
            UniformType::Float => {
                cursor += 1;
                cursor - 1
            }
            UniformType::Color => {
                let start = cursor.next_multiple_of(4);
                cursor = start + 3;
                start
            }
        })
        .collect();
    (offsets, cursor.next_multiple_of(4).max(4))
}

/// Converts a `0xRRGGBB` sRGB colour into linear RGB.
pub fn hex(rgb: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((rgb >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

/// Converts an 8-bit sRGB triple into linear RGB.
pub fn rgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [
        srgb_to_linear(r as f32 / 255.0),
        srgb_to_linear(g as f32 / 255.0),
        srgb_to_linear(b as f32 / 255.0),
    ]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}
