//! Scene lights.

use crate::math::Vec4;

/// Maximum number of lights passed to the default shaders.
pub const MAX_LIGHTS: usize = 3;

/// A directional or positional light.
///
/// `position.w` is 0 for a directional light, where `xyz` is the direction
/// the light comes from, and 1 for a positional one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub position: [f32; 4],
    /// Attenuation radius; 0 means no attenuation.
    pub radius: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::directional([0.0, 0.0, 1.0])
    }
}

impl Light {
    /// White light shining from `direction` toward the origin.
    pub fn directional(direction: [f32; 3]) -> Self {
        Self {
            ambient: [0.0, 0.0, 0.0],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            position: [direction[0], direction[1], direction[2], 0.0],
            radius: 0.0,
        }
    }

    /// White point light at `position`.
    pub fn point(position: [f32; 3], radius: f32) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            radius: radius.max(0.0),
            ..Self::directional([0.0, 0.0, 0.0])
        }
    }

    pub fn with_ambient(mut self, ambient: [f32; 3]) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_diffuse(mut self, diffuse: [f32; 3]) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 3]) -> Self {
        self.specular = specular;
        self
    }

    pub fn is_directional(&self) -> bool {
        self.position[3] == 0.0
    }

    pub fn position_vec(&self) -> Vec4 {
        Vec4::from(self.position)
    }
}

/// The lights of one scene.
///
/// Holds any number of lights; only the first [`MAX_LIGHTS`] reach the
/// shaders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lights {
    lights: Vec<Light>,
}

impl Lights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    pub fn push(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Light> {
        self.lights.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Light> {
        self.lights.iter()
    }
}

static_assertions::assert_impl_all!(Lights: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_kinds() {
        let sun = Light::directional([0.0, 1.0, 0.0]);
        assert!(sun.is_directional());
        let lamp = Light::point([1.0, 2.0, 3.0], -5.0);
        assert!(!lamp.is_directional());
        assert_eq!(lamp.radius, 0.0);
        assert_eq!(lamp.position_vec(), Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn lights_collection() {
        let mut lights = Lights::new().with_light(Light::default());
        lights.push(Light::point([0.0; 3], 10.0));
        assert_eq!(lights.len(), 2);
        assert_eq!(lights.get(1).map(|l| l.radius), Some(10.0));
        lights.clear();
        assert!(lights.is_empty());
    }
}
