//! Implementation limits, queried once per context.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::backend::GlBackend;

/// Lazily cached driver limits.
pub struct Capabilities {
    gl: Rc<dyn GlBackend>,
    max_vertex_attribs: OnceCell<u32>,
    max_combined_texture_image_units: OnceCell<u32>,
    max_texture_max_anisotropy: OnceCell<f32>,
}

impl Capabilities {
    pub(crate) fn new(gl: Rc<dyn GlBackend>) -> Self {
        Self {
            gl,
            max_vertex_attribs: OnceCell::new(),
            max_combined_texture_image_units: OnceCell::new(),
            max_texture_max_anisotropy: OnceCell::new(),
        }
    }

    /// `GL_MAX_VERTEX_ATTRIBS`
    #[must_use]
    pub fn max_vertex_attribs(&self) -> u32 {
        *self.max_vertex_attribs.get_or_init(|| {
            let max = self.gl.get_parameter_i32(glow::MAX_VERTEX_ATTRIBS);
            u32::try_from(max).unwrap_or(0)
        })
    }

    /// `GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS`
    #[must_use]
    pub fn max_combined_texture_image_units(&self) -> u32 {
        *self.max_combined_texture_image_units.get_or_init(|| {
            let max = self.gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS);
            u32::try_from(max).unwrap_or(0)
        })
    }

    /// `GL_MAX_TEXTURE_MAX_ANISOTROPY`; 1.0 when anisotropic filtering is
    /// unsupported.
    #[must_use]
    pub fn max_texture_max_anisotropy(&self) -> f32 {
        *self.max_texture_max_anisotropy.get_or_init(|| {
            self.gl
                .get_parameter_f32(glow::MAX_TEXTURE_MAX_ANISOTROPY_EXT)
                .max(1.0)
        })
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("max_vertex_attribs", &self.max_vertex_attribs.get())
            .field("max_combined_texture_image_units", &self.max_combined_texture_image_units.get())
            .field("max_texture_max_anisotropy", &self.max_texture_max_anisotropy.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    #[test]
    fn test_limits_come_from_driver() {
        let gl: Rc<dyn GlBackend> = Rc::new(RecordingBackend::new().with_max_vertex_attribs(8));
        let capabilities = Capabilities::new(gl);

        assert_eq!(capabilities.max_vertex_attribs(), 8);
        assert_eq!(capabilities.max_combined_texture_image_units(), 80);
        assert!((capabilities.max_texture_max_anisotropy() - 16.0).abs() < f32::EPSILON);
    }
}
