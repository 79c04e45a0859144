//! Material uniforms and texture slots for the program in use.

use prism_core::material::{Material, MaterialKind, PbrMaterial, TextureSlot};

use crate::backend::{GraphicsContext, UniformValue};
use crate::resources::TextureLoader;
use crate::shader::ShaderProgram;

/// Texture units available to one draw.
pub const MAX_TEXTURE_UNITS: u32 = 8;

const _: () = assert!(TextureSlot::COUNT as u32 <= MAX_TEXTURE_UNITS);

/// Uploads one material to the program in use.
///
/// Uniform names: `md` diffuse or albedo, `ma` ambient, `ms` specular, `me`
/// emission, `mshin` shininess, `metalness` and `roughness`. Each texture
/// slot is bound to its own unit and its sampler set to that unit.
#[derive(Debug, Clone, Copy)]
pub struct MaterialBinder<'a> {
    material: &'a MaterialKind,
}

impl<'a> MaterialBinder<'a> {
    pub fn new(material: &'a MaterialKind) -> Self {
        Self { material }
    }

    /// Upload colors and bind textures. Returns the number of texture units
    /// bound to a texture.
    ///
    /// A texture still loading is requested from `loader` and its unit left
    /// empty; the shape renders untextured until a later frame finds the
    /// image uploaded.
    pub fn bind(
        &self,
        program: &ShaderProgram,
        ctx: &mut dyn GraphicsContext,
        loader: &mut TextureLoader,
    ) -> usize {
        match self.material {
            MaterialKind::Basic(material) => bind_basic(material, program, ctx),
            MaterialKind::Pbr(material) => bind_pbr(material, program, ctx),
        }

        let mut bound = 0;
        for (slot, name) in self.material.textures().iter() {
            let sampler = slot.sampler_name();
            if !program.has_uniform(sampler) {
                continue;
            }
            let unit = slot.unit();
            let texture = loader.request(ctx, name);
            if texture.is_none() {
                log::debug!("Texture '{}' not ready, drawing without {:?}", name, slot);
            } else {
                bound += 1;
            }
            ctx.bind_texture(unit, texture);
            program.set_uniform(ctx, sampler, UniformValue::Int(unit as i32));
        }
        bound
    }
}

fn bind_basic(material: &Material, program: &ShaderProgram, ctx: &mut dyn GraphicsContext) {
    program.set_uniform(ctx, "md", material.diffuse.into());
    program.set_uniform(ctx, "ma", material.ambient.into());
    program.set_uniform(ctx, "ms", material.specular.into());
    program.set_uniform(ctx, "me", material.emission.into());
    program.set_uniform(ctx, "mshin", material.shininess.into());
}

fn bind_pbr(material: &PbrMaterial, program: &ShaderProgram, ctx: &mut dyn GraphicsContext) {
    program.set_uniform(ctx, "md", material.albedo.into());
    program.set_uniform(ctx, "me", material.emission.into());
    program.set_uniform(ctx, "metalness", material.metalness.into());
    program.set_uniform(ctx, "roughness", material.roughness.into());
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use prism_core::deferred::{deferred, resolved};
    use prism_core::mesh::AttributeBits;

    use super::*;
    use crate::backend::DummyContext;
    use crate::error::TextureError;
    use crate::resources::ImageData;
    use crate::shader::{ShaderFlags, ShaderInfo};

    fn program(ctx: &mut DummyContext, flags: ShaderFlags) -> ShaderProgram {
        let program = ShaderProgram::build(ctx, Rc::new(ShaderInfo::default_shader()), flags);
        if let Some(handle) = program.handle() {
            ctx.use_program(handle);
        }
        program
    }

    fn solid_loader() -> TextureLoader {
        TextureLoader::new(|_: &str| resolved(Ok(ImageData::solid(1, 1, [255; 4]))))
    }

    #[test]
    fn basic_material_colors() {
        let mut ctx = DummyContext::new();
        let material = Material::new()
            .with_diffuse([1.0, 0.0, 0.0, 0.5])
            .with_specular([1.0; 3])
            .with_shininess(32.0);
        let flags = ShaderFlags::for_material(&material, AttributeBits::NORMAL, true);
        let program = program(&mut ctx, flags);
        let handle = program.handle().unwrap();
        let kind = MaterialKind::from(material);

        MaterialBinder::new(&kind).bind(&program, &mut ctx, &mut solid_loader());
        assert_eq!(
            ctx.uniform_value(handle, "md"),
            Some(UniformValue::Vec4([1.0, 0.0, 0.0, 0.5]))
        );
        assert_eq!(ctx.uniform_value(handle, "mshin"), Some(UniformValue::Float(32.0)));
        assert_eq!(ctx.uniform_value(handle, "ms"), Some(UniformValue::Vec3([1.0; 3])));
    }

    #[test]
    fn pbr_material_uses_albedo_slot() {
        let mut ctx = DummyContext::new();
        let material = PbrMaterial::new()
            .with_albedo([0.1, 0.2, 0.3, 1.0])
            .with_metalness(0.75);
        let flags = ShaderFlags::for_pbr_material(&material, AttributeBits::NORMAL, true);
        let program = program(&mut ctx, flags);
        let handle = program.handle().unwrap();
        let kind = MaterialKind::from(material);

        MaterialBinder::new(&kind).bind(&program, &mut ctx, &mut solid_loader());
        assert_eq!(
            ctx.uniform_value(handle, "md"),
            Some(UniformValue::Vec4([0.1, 0.2, 0.3, 1.0]))
        );
        assert_eq!(ctx.uniform_value(handle, "metalness"), Some(UniformValue::Float(0.75)));
        assert_eq!(ctx.uniform_value(handle, "roughness"), Some(UniformValue::Float(1.0)));
    }

    #[test]
    fn loaded_texture_is_bound_to_its_unit() {
        let mut ctx = DummyContext::new();
        let material = Material::new().with_texture(TextureSlot::Albedo, "brick");
        let flags = ShaderFlags::for_material(&material, AttributeBits::TEXCOORD, false);
        let program = program(&mut ctx, flags);
        let handle = program.handle().unwrap();
        let kind = MaterialKind::from(material);

        let bound = MaterialBinder::new(&kind).bind(&program, &mut ctx, &mut solid_loader());
        assert_eq!(bound, 1);
        let unit = TextureSlot::Albedo.unit();
        assert!(ctx.bound_texture(unit).is_some());
        assert_eq!(
            ctx.uniform_value(handle, "albedoMap"),
            Some(UniformValue::Int(unit as i32))
        );
    }

    #[test]
    fn pending_texture_binds_after_load() {
        let mut ctx = DummyContext::new();
        let (resolver, handle) = deferred::<Result<ImageData, TextureError>>();
        let mut handle = Some(handle);
        let mut loader =
            TextureLoader::new(move |_: &str| handle.take().expect("one request per name"));
        let material = Material::new().with_texture(TextureSlot::Albedo, "slow");
        let flags = ShaderFlags::for_material(&material, AttributeBits::TEXCOORD, false);
        let program = program(&mut ctx, flags);
        let kind = MaterialKind::from(material);
        let binder = MaterialBinder::new(&kind);

        assert_eq!(binder.bind(&program, &mut ctx, &mut loader), 0);
        assert_eq!(ctx.bound_texture(0), None);

        resolver.resolve(Ok(ImageData::solid(2, 2, [0, 0, 0, 255])));
        assert_eq!(binder.bind(&program, &mut ctx, &mut loader), 1);
        assert_eq!(ctx.bound_texture(0), loader.texture("slow"));
    }

    #[test]
    fn samplers_missing_from_program_are_skipped() {
        let mut ctx = DummyContext::new();
        // No texture coordinates: the variant has no albedo sampler.
        let material = Material::new().with_texture(TextureSlot::Albedo, "brick");
        let flags = ShaderFlags::for_material(&material, AttributeBits::empty(), false);
        let program = program(&mut ctx, flags);
        let kind = MaterialKind::from(material);
        let mut loader = solid_loader();

        assert_eq!(MaterialBinder::new(&kind).bind(&program, &mut ctx, &mut loader), 0);
        assert_eq!(loader.status("brick"), crate::resources::LoadStatus::NotLoaded);
    }
}
