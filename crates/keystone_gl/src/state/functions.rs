//! Fixed-function parameters: clear color, blending, depth, culling, masks,
//! stencil and scissor.

use super::{Context, Frame, Viewport};
use crate::backend::GlBackend;
use crate::enums::{BlendFactor, CompareFunction, CullFace, StencilAction};

/// Factors of `glBlendFuncSeparate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunction {
    /// Source color factor.
    pub src_rgb: BlendFactor,
    /// Destination color factor.
    pub dst_rgb: BlendFactor,
    /// Source alpha factor.
    pub src_alpha: BlendFactor,
    /// Destination alpha factor.
    pub dst_alpha: BlendFactor,
}

/// Arguments of `glStencilFunc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFunction {
    /// Comparison.
    pub function: CompareFunction,
    /// Reference value.
    pub reference: i32,
    /// Mask applied to both sides of the comparison.
    pub mask: u32,
}

/// Arguments of `glStencilOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOperation {
    /// Stencil test fails.
    pub stencil_fail: StencilAction,
    /// Stencil passes, depth fails.
    pub depth_fail: StencilAction,
    /// Both pass.
    pub pass: StencilAction,
}

/// Scissor rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum FunctionKey {
    ClearColor,
    Blend,
    DepthFunc,
    CullFace,
    ColorMask,
    DepthMask,
    StencilFunc,
    StencilMask,
    StencilOp,
    Scissor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum FunctionState {
    ClearColor([f32; 4]),
    Blend(BlendFunction),
    DepthFunc(CompareFunction),
    CullFace(CullFace),
    ColorMask([bool; 4]),
    DepthMask(bool),
    StencilFunc(StencilFunction),
    StencilMask(u32),
    StencilOp(StencilOperation),
    Scissor(ScissorRect),
}

impl FunctionState {
    const fn key(&self) -> FunctionKey {
        match self {
            Self::ClearColor(_) => FunctionKey::ClearColor,
            Self::Blend(_) => FunctionKey::Blend,
            Self::DepthFunc(_) => FunctionKey::DepthFunc,
            Self::CullFace(_) => FunctionKey::CullFace,
            Self::ColorMask(_) => FunctionKey::ColorMask,
            Self::DepthMask(_) => FunctionKey::DepthMask,
            Self::StencilFunc(_) => FunctionKey::StencilFunc,
            Self::StencilMask(_) => FunctionKey::StencilMask,
            Self::StencilOp(_) => FunctionKey::StencilOp,
            Self::Scissor(_) => FunctionKey::Scissor,
        }
    }

    /// GL defaults. The scissor box covers the default framebuffer.
    const fn default_for(key: FunctionKey, viewport: Viewport) -> Self {
        match key {
            FunctionKey::ClearColor => Self::ClearColor([0.0; 4]),
            FunctionKey::Blend => Self::Blend(BlendFunction {
                src_rgb: BlendFactor::One,
                dst_rgb: BlendFactor::Zero,
                src_alpha: BlendFactor::One,
                dst_alpha: BlendFactor::Zero,
            }),
            FunctionKey::DepthFunc => Self::DepthFunc(CompareFunction::Less),
            FunctionKey::CullFace => Self::CullFace(CullFace::Back),
            FunctionKey::ColorMask => Self::ColorMask([true; 4]),
            FunctionKey::DepthMask => Self::DepthMask(true),
            FunctionKey::StencilFunc => Self::StencilFunc(StencilFunction {
                function: CompareFunction::Always,
                reference: 0,
                mask: 0xFF,
            }),
            FunctionKey::StencilMask => Self::StencilMask(0xFF),
            FunctionKey::StencilOp => Self::StencilOp(StencilOperation {
                stencil_fail: StencilAction::Keep,
                depth_fail: StencilAction::Keep,
                pass: StencilAction::Keep,
            }),
            FunctionKey::Scissor => Self::Scissor(ScissorRect {
                x: 0,
                y: 0,
                width: viewport.width,
                height: viewport.height,
            }),
        }
    }

    fn apply(&self, gl: &dyn GlBackend) {
        tracing::trace!(state = ?self, "function");

        match *self {
            Self::ClearColor([r, g, b, a]) => gl.clear_color(r, g, b, a),
            Self::Blend(blend) => gl.blend_func_separate(
                blend.src_rgb.raw(),
                blend.dst_rgb.raw(),
                blend.src_alpha.raw(),
                blend.dst_alpha.raw(),
            ),
            Self::DepthFunc(function) => gl.depth_func(function.raw()),
            Self::CullFace(face) => gl.cull_face(face.raw()),
            Self::ColorMask([r, g, b, a]) => gl.color_mask(r, g, b, a),
            Self::DepthMask(mask) => gl.depth_mask(mask),
            Self::StencilFunc(func) => gl.stencil_func(func.function.raw(), func.reference, func.mask),
            Self::StencilMask(mask) => gl.stencil_mask(mask),
            Self::StencilOp(op) => gl.stencil_op(op.stencil_fail.raw(), op.depth_fail.raw(), op.pass.raw()),
            Self::Scissor(rect) => gl.scissor(rect.x, rect.y, rect.width, rect.height),
        }
    }
}

/// Unwraps the variant a [`FunctionKey`] is guaranteed to map to.
macro_rules! function_value {
    ($ctx:expr, $variant:ident) => {
        match $ctx.function(FunctionKey::$variant) {
            FunctionState::$variant(value) => value,
            other => unreachable!("overlay for {:?} holds {other:?}", FunctionKey::$variant),
        }
    };
}

impl Context {
    // =========================================================================
    // SETTERS
    // =========================================================================

    /// `glClearColor`.
    pub fn set_clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.set_function(FunctionState::ClearColor([red, green, blue, alpha]));
    }

    /// Same factors for color and alpha.
    pub fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.set_blend_function_separate(src, dst, src, dst);
    }

    /// `glBlendFuncSeparate`.
    pub fn set_blend_function_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.set_function(FunctionState::Blend(BlendFunction {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        }));
    }

    /// `glDepthFunc`.
    pub fn set_depth_function(&mut self, function: CompareFunction) {
        self.set_function(FunctionState::DepthFunc(function));
    }

    /// `glCullFace`.
    pub fn set_cull_face(&mut self, face: CullFace) {
        self.set_function(FunctionState::CullFace(face));
    }

    /// `glColorMask`.
    pub fn set_color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.set_function(FunctionState::ColorMask([red, green, blue, alpha]));
    }

    /// `glDepthMask`.
    pub fn set_depth_mask(&mut self, mask: bool) {
        self.set_function(FunctionState::DepthMask(mask));
    }

    /// `glStencilFunc`.
    pub fn set_stencil_function(&mut self, function: CompareFunction, reference: i32, mask: u32) {
        self.set_function(FunctionState::StencilFunc(StencilFunction {
            function,
            reference,
            mask,
        }));
    }

    /// `glStencilMask`.
    pub fn set_stencil_mask(&mut self, mask: u32) {
        self.set_function(FunctionState::StencilMask(mask));
    }

    /// `glStencilOp`.
    pub fn set_stencil_operation(
        &mut self,
        stencil_fail: StencilAction,
        depth_fail: StencilAction,
        pass: StencilAction,
    ) {
        self.set_function(FunctionState::StencilOp(StencilOperation {
            stencil_fail,
            depth_fail,
            pass,
        }));
    }

    /// `glScissor`.
    pub fn set_scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.set_function(FunctionState::Scissor(ScissorRect { x, y, width, height }));
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// Effective clear color.
    #[must_use]
    pub fn clear_color(&self) -> [f32; 4] {
        function_value!(self, ClearColor)
    }

    /// Effective blend factors.
    #[must_use]
    pub fn blend_function(&self) -> BlendFunction {
        function_value!(self, Blend)
    }

    /// Effective depth comparison.
    #[must_use]
    pub fn depth_function(&self) -> CompareFunction {
        function_value!(self, DepthFunc)
    }

    /// Effective culled facet.
    #[must_use]
    pub fn cull_face(&self) -> CullFace {
        function_value!(self, CullFace)
    }

    /// Effective color write mask.
    #[must_use]
    pub fn color_mask(&self) -> [bool; 4] {
        function_value!(self, ColorMask)
    }

    /// Effective depth write mask.
    #[must_use]
    pub fn depth_mask(&self) -> bool {
        function_value!(self, DepthMask)
    }

    /// Effective stencil function.
    #[must_use]
    pub fn stencil_function(&self) -> StencilFunction {
        function_value!(self, StencilFunc)
    }

    /// Effective stencil write mask.
    #[must_use]
    pub fn stencil_mask(&self) -> u32 {
        function_value!(self, StencilMask)
    }

    /// Effective stencil actions.
    #[must_use]
    pub fn stencil_operation(&self) -> StencilOperation {
        function_value!(self, StencilOp)
    }

    /// Effective scissor rectangle.
    #[must_use]
    pub fn scissor(&self) -> ScissorRect {
        function_value!(self, Scissor)
    }

    // =========================================================================
    // OVERLAY
    // =========================================================================

    fn function(&self, key: FunctionKey) -> FunctionState {
        self.function_at(self.current(), key)
    }

    fn function_at(&self, visible: usize, key: FunctionKey) -> FunctionState {
        self.lookup(visible, |frame| frame.functions.get(&key).copied())
            .unwrap_or_else(|| FunctionState::default_for(key, self.default_viewport))
    }

    fn set_function(&mut self, value: FunctionState) {
        let key = value.key();
        if self.function_at(self.current(), key) == value {
            return;
        }

        value.apply(self.gl.as_ref());

        let inherited = self.function_at(self.parent(), key);
        let top = self.top_mut();
        if inherited == value {
            top.functions.remove(&key);
        } else {
            top.functions.insert(key, value);
        }
    }

    pub(super) fn restore_functions(&mut self, frame: &Frame) {
        for &key in frame.functions.keys() {
            self.function(key).apply(self.gl.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GlCall, RecordingBackend};
    use std::rc::Rc;

    fn context() -> (Rc<RecordingBackend>, Context) {
        let recording = Rc::new(RecordingBackend::new());
        let ctx = Context::new(recording.clone(), 800, 600);
        (recording, ctx)
    }

    #[test]
    fn test_defaults() {
        let (_, ctx) = context();

        assert_eq!(ctx.clear_color(), [0.0; 4]);
        assert_eq!(ctx.depth_function(), CompareFunction::Less);
        assert_eq!(ctx.cull_face(), CullFace::Back);
        assert_eq!(ctx.stencil_mask(), 0xFF);
        assert_eq!(ctx.blend_function().dst_rgb, BlendFactor::Zero);
        assert_eq!(
            ctx.scissor(),
            ScissorRect { x: 0, y: 0, width: 800, height: 600 }
        );
    }

    #[test]
    fn test_setting_default_issues_nothing() {
        let (recording, mut ctx) = context();

        ctx.set_depth_function(CompareFunction::Less);
        ctx.set_color_mask(true, true, true, true);
        ctx.set_scissor(0, 0, 800, 600);

        assert_eq!(recording.call_count(), 0);
    }

    #[test]
    fn test_cull_face_issues_cull_face() {
        let (recording, mut ctx) = context();

        ctx.push();
        ctx.set_cull_face(CullFace::Front);
        assert_eq!(recording.state().cull_face, glow::FRONT);
        assert_eq!(recording.state().depth_func, glow::LESS);
        ctx.pop();

        assert_eq!(recording.state().cull_face, glow::BACK);
    }

    #[test]
    fn test_nested_functions_restore_to_parent() {
        let (recording, mut ctx) = context();

        ctx.push();
        ctx.set_clear_color(0.1, 0.2, 0.3, 1.0);
        ctx.push();
        ctx.set_clear_color(1.0, 1.0, 1.0, 1.0);
        ctx.set_stencil_function(CompareFunction::Equal, 1, 0x0F);
        ctx.pop();

        assert_eq!(ctx.clear_color(), [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(recording.state().clear_color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(recording.state().stencil_func, (glow::ALWAYS, 0, 0xFF));
        ctx.pop();

        assert_eq!(ctx.clear_color(), [0.0; 4]);
    }

    #[test]
    fn test_blend_shorthand_matches_separate() {
        let (recording, mut ctx) = context();

        ctx.push();
        ctx.set_blend_function(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        ctx.set_blend_function_separate(
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
        );

        let blends = recording.count(|call| matches!(call, GlCall::BlendFuncSeparate { .. }));
        assert_eq!(blends, 1);
        ctx.pop();
    }
}
