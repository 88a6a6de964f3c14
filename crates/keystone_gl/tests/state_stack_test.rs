//! # State Stack Tests
//!
//! End-to-end checks of the overlay stack against the headless backend:
//! - Redundant state changes issue no native calls
//! - Popping a frame restores the parent's state on the simulated GPU
//! - Stack misuse is fatal
//! - Driver debug messages are drained into tracing

use std::rc::Rc;

use keystone_gl::{
    Attachment, BlendFactor, Buffer, BufferTarget, Capability, CompareFunction, Context, ContextConfig,
    ContextScope, CullFace, DataType, DebugMessage, Format, Framebuffer, FramebufferTarget, GlCall, InternalFormat, Program, RecordingBackend,
    Renderbuffer, ShaderKind, StencilAction, Texture, TextureTarget, VertexArray, Viewport,
};

fn context() -> (Rc<RecordingBackend>, Context) {
    let recording = Rc::new(RecordingBackend::new());
    let ctx = Context::new(recording.clone(), 800, 600);
    (recording, ctx)
}

fn linked_program(ctx: &Context) -> Program {
    let mut program = Program::new(ctx);
    program.attach_source(ctx, ShaderKind::Vertex, "void main() {}");
    program.attach_source(ctx, ShaderKind::Fragment, "void main() {}");
    program.link(ctx);
    program
}

/// Applies one change of every tracked kind.
fn change_everything(
    ctx: &mut Context,
    buffer: &Buffer,
    framebuffer: &Framebuffer,
    renderbuffer: &Renderbuffer,
    texture: &Texture,
    vertex_array: &VertexArray,
    program: &Program,
) {
    ctx.bind_buffer(buffer);
    ctx.bind_framebuffer(FramebufferTarget::Both, framebuffer);
    ctx.bind_renderbuffer(renderbuffer);
    ctx.bind_texture(0, texture);
    ctx.bind_vertex_array(vertex_array);
    ctx.use_program(program);

    ctx.enable(Capability::Blend);
    ctx.enable(Capability::DepthTest);
    ctx.disable(Capability::Multisample);

    ctx.set_clear_color(0.1, 0.2, 0.3, 1.0);
    ctx.set_blend_function(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    ctx.set_depth_function(CompareFunction::LessOrEqual);
    ctx.set_cull_face(CullFace::Front);
    ctx.set_color_mask(true, false, true, false);
    ctx.set_depth_mask(false);
    ctx.set_stencil_function(CompareFunction::Equal, 1, 0x0F);
    ctx.set_stencil_mask(0x0F);
    ctx.set_stencil_operation(StencilAction::Keep, StencilAction::Replace, StencilAction::Increment);
    ctx.set_scissor(10, 10, 100, 100);
}

/// Test: a frame that changes every kind of state leaves the GPU exactly as
/// it found it once popped.
#[test]
fn test_pop_restores_every_kind() {
    let (recording, mut ctx) = context();
    let buffer = Buffer::new(&ctx, BufferTarget::Array);
    let framebuffer = Framebuffer::new(&ctx, 256, 256);
    let renderbuffer = Renderbuffer::new(&ctx);
    let texture = Texture::new(&ctx, TextureTarget::Texture2D);
    let vertex_array = VertexArray::new(&ctx);
    let program = linked_program(&ctx);

    let before = recording.state();
    {
        let mut scope = ContextScope::new(&mut ctx);
        change_everything(&mut scope, &buffer, &framebuffer, &renderbuffer, &texture, &vertex_array, &program);

        let inside = recording.state();
        assert_eq!(inside.draw_framebuffer, framebuffer.name());
        assert_eq!(inside.read_framebuffer, framebuffer.name());
        assert_eq!(inside.viewport, (0, 0, 256, 256));
        assert_eq!(inside.scissor, (10, 10, 100, 100));
        assert!(!inside.enabled.contains(&glow::MULTISAMPLE));
    }

    assert_eq!(recording.state(), before);
    assert_eq!(ctx.viewport(), Viewport::new(800, 600));
    assert_eq!(ctx.bound_framebuffer(FramebufferTarget::Draw), 0);
    assert_eq!(ctx.current_program(), 0);
    assert!(ctx.is_enabled(Capability::Multisample));
}

/// Test: nested frames restore to the parent frame, not to the root.
#[test]
fn test_nested_frames_restore_to_parent() {
    let (recording, mut ctx) = context();
    let outer_buffer = Buffer::new(&ctx, BufferTarget::Array);
    let inner_buffer = Buffer::new(&ctx, BufferTarget::Array);

    ctx.push();
    ctx.bind_buffer(&outer_buffer);
    ctx.enable(Capability::CullFace);
    ctx.set_depth_function(CompareFunction::Greater);
    let outer = recording.state();

    ctx.push();
    ctx.bind_buffer(&inner_buffer);
    ctx.disable(Capability::CullFace);
    ctx.set_depth_function(CompareFunction::Always);
    ctx.pop();

    assert_eq!(recording.state(), outer);
    assert_eq!(ctx.bound_buffer(BufferTarget::Array), outer_buffer.name());
    assert!(ctx.is_enabled(Capability::CullFace));
    assert_eq!(ctx.depth_function(), CompareFunction::Greater);

    ctx.pop();
    assert_eq!(ctx.bound_buffer(BufferTarget::Array), 0);
}

/// Test: binding X twice issues one call; Y then X issues two more.
#[test]
fn test_binding_is_idempotent() {
    let (recording, mut ctx) = context();
    let x = Buffer::new(&ctx, BufferTarget::Array);
    let y = Buffer::new(&ctx, BufferTarget::Array);
    let binds = |recording: &RecordingBackend| recording.count(|call| matches!(call, GlCall::BindBuffer { .. }));

    ctx.bind_buffer(&x);
    ctx.bind_buffer(&x);
    assert_eq!(binds(&recording), 1);

    ctx.bind_buffer(&y);
    ctx.bind_buffer(&x);
    assert_eq!(binds(&recording), 3);
}

/// Test: a frame that only re-sets inherited values pops without any call.
#[test]
fn test_redundant_frame_pops_silently() {
    let (recording, mut ctx) = context();
    let buffer = Buffer::new(&ctx, BufferTarget::Uniform);
    ctx.bind_buffer(&buffer);
    ctx.enable(Capability::Blend);
    recording.clear_calls();

    {
        let mut scope = ctx.scope();
        scope.bind_buffer(&buffer);
        scope.enable(Capability::Blend);
        scope.set_depth_mask(true);
    }

    assert_eq!(recording.call_count(), 0);
}

/// Test: a framebuffer bound and re-bound in a child frame keeps the
/// viewport consistent with the binding after every pop.
#[test]
fn test_viewport_follows_draw_framebuffer() {
    let (recording, mut ctx) = context();
    let small = Framebuffer::new(&ctx, 64, 32);
    let large = Framebuffer::new(&ctx, 1024, 512);

    small.bind_for_drawing(&mut ctx);
    {
        let mut scope = ctx.scope();
        large.bind_for_drawing(&mut scope);
        assert_eq!(scope.viewport(), Viewport::new(1024, 512));
    }

    assert_eq!(ctx.viewport(), Viewport::new(64, 32));
    assert_eq!(recording.state().viewport, (0, 0, 64, 32));

    ctx.bind_default_framebuffer(FramebufferTarget::Draw);
    assert_eq!(recording.state().viewport, (0, 0, 800, 600));
}

/// Test: resource setup done inside scopes leaves no bindings behind.
#[test]
fn test_resource_setup_leaves_no_trace() {
    let (recording, mut ctx) = context();
    let before = recording.state();

    {
        let mut scope = ctx.scope();
        let mut framebuffer = Framebuffer::new(&scope, 128, 128);
        framebuffer.attach_texture(&mut scope, Attachment::Color(0), InternalFormat::Rgba8);
        framebuffer.attach_renderbuffer(&mut scope, Attachment::Depth, InternalFormat::DepthComponent24);
        framebuffer.set_draw_buffers(&mut scope, &[0]);
    }

    assert_eq!(recording.state(), before);
}

/// Test: objects are deleted when their owners drop.
#[test]
fn test_resources_release_names() {
    let (recording, ctx) = context();
    let buffer = Buffer::new(&ctx, BufferTarget::Array);
    let name = buffer.name();

    assert!(recording.is_live(name));
    drop(buffer);
    assert!(!recording.is_live(name));
}

/// Test: popping the root frame is fatal.
#[test]
#[should_panic(expected = "underflow")]
fn test_underflow_is_fatal() {
    let (_, mut ctx) = context();
    ctx.push();
    ctx.pop();
    ctx.pop();
}

/// Test: dropping a context with frames still pushed is fatal.
#[test]
#[should_panic(expected = "inconsistent")]
fn test_unbalanced_drop_is_fatal() {
    let (_, mut ctx) = context();
    ctx.push();
    drop(ctx);
}

/// Test: configuration drives the default viewport and scissor.
#[test]
fn test_context_from_config() {
    let recording = Rc::new(RecordingBackend::with_viewport(1920, 1080));
    let config = ContextConfig::from_toml_str("viewport_width = 1920\nviewport_height = 1080\n").unwrap();
    let ctx = Context::from_config(recording, &config);

    assert_eq!(ctx.default_viewport(), Viewport::new(1920, 1080));
    assert_eq!(ctx.scissor().width, 1920);
    assert_eq!(ctx.scissor().height, 1080);
}

/// Test: debug output requested by configuration drains every queued
/// message, across several batches.
#[test]
fn test_debug_messages_flushed() {
    let recording = Rc::new(RecordingBackend::new().with_debug_context());
    let config = ContextConfig::from_toml_str("viewport_width = 800\nviewport_height = 600\ndebug_output = true\n").unwrap();
    let ctx = Context::from_config(recording.clone(), &config);

    assert!(recording.calls().contains(&GlCall::EnableDebugOutput { granted: true }));
    for id in 0..150 {
        recording.push_debug_message(DebugMessage::from_raw(
            glow::DEBUG_SOURCE_API,
            glow::DEBUG_TYPE_PERFORMANCE,
            id,
            glow::DEBUG_SEVERITY_LOW,
            "buffer moved to system memory",
        ));
    }

    assert_eq!(ctx.flush_debug_messages(), 150);
    assert_eq!(recording.pending_debug_messages(), 0);
    assert_eq!(ctx.flush_debug_messages(), 0);
}

/// Test: without the debug flag nothing is enabled and nothing is queued.
#[test]
fn test_debug_output_unavailable() {
    let (recording, mut ctx) = context();

    assert!(!ctx.enable_debug_output());
    recording.push_debug_message(DebugMessage::from_raw(0, 0, 0, 0, "ignored"));
    assert_eq!(ctx.flush_debug_messages(), 0);
}

/// Test: filling an array texture inside a scope leaves no binding behind.
#[test]
fn test_array_texture_setup_leaves_no_trace() {
    let (recording, mut ctx) = context();
    let mut texture = Texture::new(&ctx, TextureTarget::Texture2DArray);
    let before = recording.state();

    {
        let mut scope = ctx.scope();
        texture.initialize_array(&mut scope, InternalFormat::Rgba8, 8, 8, 3);
        for layer in 0..3 {
            texture
                .set_layer_data(&mut scope, layer, Format::Rgba, DataType::UnsignedByte, &[0; 8 * 8 * 4])
                .unwrap();
        }
    }

    assert_eq!(recording.state(), before);
    assert_eq!(recording.count(|call| matches!(call, GlCall::TexSubImage3D { .. })), 3);
}
