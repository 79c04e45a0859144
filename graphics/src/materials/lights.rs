//! Scene lights as view-space uniforms.

use prism_core::material::{Light, Lights, MAX_LIGHTS};
use prism_core::math::{Mat4, Vec3, mat4_transform_point, mat4_transform_vector, vec3_normalize};

use crate::backend::{GraphicsContext, UniformValue};
use crate::shader::ShaderProgram;

const FIELDS: [&str; 5] = ["ambient", "diffuse", "specular", "position", "radius"];

/// Uploads scene lights into the `lights[MAX_LIGHTS]` uniform array.
///
/// Positions are moved into view space; directions are rotated and
/// normalized. Slots past the last light are zero-filled, so a light
/// removed between frames stops contributing.
#[derive(Debug, Clone, Copy)]
pub struct LightsBinder<'a> {
    lights: &'a Lights,
}

impl<'a> LightsBinder<'a> {
    pub fn new(lights: &'a Lights) -> Self {
        Self { lights }
    }

    /// Fill every slot of the program's light array. Returns the number of
    /// lights uploaded.
    pub fn bind(
        &self,
        program: &ShaderProgram,
        ctx: &mut dyn GraphicsContext,
        view: &Mat4,
    ) -> usize {
        for slot in 0..MAX_LIGHTS {
            match self.lights.get(slot) {
                Some(light) => bind_light(program, ctx, slot, light, view),
                None => clear_slot(program, ctx, slot),
            }
        }
        self.lights.len().min(MAX_LIGHTS)
    }
}

fn uniform_name(slot: usize, field: &str) -> String {
    format!("lights[{slot}].{field}")
}

/// `position` of `light` in view space.
fn view_position(light: &Light, view: &Mat4) -> [f32; 4] {
    let [x, y, z, w] = light.position;
    let p = Vec3::new(x, y, z);
    if light.is_directional() {
        let d = vec3_normalize(mat4_transform_vector(view, &p));
        [d.x, d.y, d.z, 0.0]
    } else {
        let p = mat4_transform_point(view, &p);
        [p.x, p.y, p.z, w]
    }
}

fn bind_light(
    program: &ShaderProgram,
    ctx: &mut dyn GraphicsContext,
    slot: usize,
    light: &Light,
    view: &Mat4,
) {
    let values: [UniformValue; 5] = [
        light.ambient.into(),
        light.diffuse.into(),
        light.specular.into(),
        view_position(light, view).into(),
        light.radius.into(),
    ];
    for (field, value) in FIELDS.iter().zip(values) {
        program.set_uniform(ctx, &uniform_name(slot, field), value);
    }
}

fn clear_slot(program: &ShaderProgram, ctx: &mut dyn GraphicsContext, slot: usize) {
    let zeros = [
        UniformValue::Vec3([0.0; 3]),
        UniformValue::Vec3([0.0; 3]),
        UniformValue::Vec3([0.0; 3]),
        UniformValue::Vec4([0.0; 4]),
        UniformValue::Float(0.0),
    ];
    for (field, value) in FIELDS.iter().zip(zeros) {
        program.set_uniform(ctx, &uniform_name(slot, field), value);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use prism_core::math::mat4_from_translation;

    use super::*;
    use crate::backend::{ContextCall, DummyContext, ProgramId};
    use crate::shader::{ShaderFlags, ShaderInfo};

    fn lit_program(ctx: &mut DummyContext) -> (ShaderProgram, ProgramId) {
        let program = ShaderProgram::build(
            ctx,
            Rc::new(ShaderInfo::default_shader()),
            ShaderFlags::LIGHTING,
        );
        let handle = program.handle().unwrap();
        ctx.use_program(handle);
        (program, handle)
    }

    #[test]
    fn unused_slots_are_zero_filled() {
        let mut ctx = DummyContext::new();
        let (program, handle) = lit_program(&mut ctx);
        let lights = Lights::new().with_light(Light::directional([0.0, 0.0, 2.0]));

        let bound = LightsBinder::new(&lights).bind(&program, &mut ctx, &Mat4::identity());
        assert_eq!(bound, 1);
        assert_eq!(
            ctx.uniform_value(handle, "lights[0].position"),
            Some(UniformValue::Vec4([0.0, 0.0, 1.0, 0.0]))
        );
        for slot in 1..MAX_LIGHTS {
            assert_eq!(
                ctx.uniform_value(handle, &uniform_name(slot, "diffuse")),
                Some(UniformValue::Vec3([0.0; 3]))
            );
            assert_eq!(
                ctx.uniform_value(handle, &uniform_name(slot, "specular")),
                Some(UniformValue::Vec3([0.0; 3]))
            );
            assert_eq!(
                ctx.uniform_value(handle, &uniform_name(slot, "position")),
                Some(UniformValue::Vec4([0.0; 4]))
            );
        }
    }

    #[test]
    fn positions_move_to_view_space() {
        let mut ctx = DummyContext::new();
        let (program, handle) = lit_program(&mut ctx);
        let lights = Lights::new()
            .with_light(Light::point([1.0, 2.0, 3.0], 5.0))
            .with_light(Light::directional([1.0, 0.0, 0.0]));
        let view = mat4_from_translation(Vec3::new(0.0, 0.0, -10.0));

        LightsBinder::new(&lights).bind(&program, &mut ctx, &view);
        assert_eq!(
            ctx.uniform_value(handle, "lights[0].position"),
            Some(UniformValue::Vec4([1.0, 2.0, -7.0, 1.0]))
        );
        assert_eq!(
            ctx.uniform_value(handle, "lights[0].radius"),
            Some(UniformValue::Float(5.0))
        );
        // Translation leaves directions alone.
        assert_eq!(
            ctx.uniform_value(handle, "lights[1].position"),
            Some(UniformValue::Vec4([1.0, 0.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn extra_lights_are_ignored() {
        let mut ctx = DummyContext::new();
        let (program, _) = lit_program(&mut ctx);
        let mut lights = Lights::new();
        for i in 0..5 {
            lights.push(Light::point([i as f32, 0.0, 0.0], 0.0));
        }
        let bound = LightsBinder::new(&lights).bind(&program, &mut ctx, &Mat4::identity());
        assert_eq!(bound, MAX_LIGHTS);
    }

    #[test]
    fn rebinding_unchanged_lights_uploads_nothing() {
        let mut ctx = DummyContext::new();
        let (program, _) = lit_program(&mut ctx);
        let lights = Lights::new().with_light(Light::default());
        let binder = LightsBinder::new(&lights);
        binder.bind(&program, &mut ctx, &Mat4::identity());
        ctx.clear_calls();
        binder.bind(&program, &mut ctx, &Mat4::identity());
        assert_eq!(
            ctx.count_calls(|c| matches!(c, ContextCall::SetUniform { .. })),
            0
        );
    }
}
