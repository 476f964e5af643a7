use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlElement, WebGl2RenderingContext as GL, WebGlBuffer,
    WebGlContextAttributes, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject, WebglLoseContext,
};

use crate::config::AlphaMode;
use crate::error::{EffectError, ShaderStage};
use crate::shader::{fragment_source, FULLSCREEN_TRIANGLE, POSITION_LOCATION, VERTEX_SOURCE};
use crate::surface::GpuContext;
use crate::uniforms::{DirtySet, RayUniforms, Uniform, UniformValue};

/// WebGL2 resources behind one render surface. The canvas is appended to the
/// container on creation and removed again on release.
pub struct WebGlContext {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: Option<WebGlProgram>,
    vao: Option<WebGlVertexArrayObject>,
    buffer: Option<WebGlBuffer>,
    locations: [Option<WebGlUniformLocation>; Uniform::COUNT],
    released: bool,
}

impl WebGlContext {
    pub fn create(container: &HtmlElement, alpha: AlphaMode) -> Result<Self, EffectError> {
        let document = container
            .owner_document()
            .ok_or_else(|| EffectError::Dom("container has no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(EffectError::from_js)?
            .dyn_into()
            .map_err(|_| EffectError::Dom("created element is not a canvas".into()))?;
        // Out of flow, so the drawing-buffer size never feeds back into the
        // container's layout size.
        let style = canvas.style();
        for (name, value) in [
            ("display", "block"),
            ("position", "absolute"),
            ("inset", "0"),
            ("width", "100%"),
            ("height", "100%"),
        ] {
            style.set_property(name, value).map_err(EffectError::from_js)?;
        }

        let attrs = WebGlContextAttributes::new();
        attrs.set_alpha(true);
        attrs.set_premultiplied_alpha(false);
        attrs.set_antialias(false);
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attrs)
            .map_err(|_| EffectError::ContextUnavailable)?
            .ok_or(EffectError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| EffectError::ContextUnavailable)?;

        let mut ctx = Self {
            gl,
            canvas,
            program: None,
            vao: None,
            buffer: None,
            locations: Default::default(),
            released: false,
        };
        // A half-built context still holds a live GL context; hand it back
        // before reporting the failure.
        if let Err(err) = ctx.build(alpha) {
            ctx.release();
            return Err(err);
        }
        container
            .append_child(&ctx.canvas)
            .map_err(EffectError::from_js)?;
        Ok(ctx)
    }

    fn build(&mut self, alpha: AlphaMode) -> Result<(), EffectError> {
        let gl = &self.gl;
        let vert = compile_shader(gl, ShaderStage::Vertex, VERTEX_SOURCE)?;
        let frag = match compile_shader(gl, ShaderStage::Fragment, &fragment_source(alpha)) {
            Ok(frag) => frag,
            Err(err) => {
                gl.delete_shader(Some(&vert));
                return Err(err);
            }
        };
        let linked = link_program(gl, &vert, &frag);
        gl.delete_shader(Some(&vert));
        gl.delete_shader(Some(&frag));
        let program = linked?;
        gl.use_program(Some(&program));

        for slot in Uniform::ALL {
            self.locations[slot.index()] = gl.get_uniform_location(&program, slot.name());
        }
        self.program = Some(program);

        let vao = gl
            .create_vertex_array()
            .ok_or(EffectError::Resource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        self.vao = Some(vao);

        let buffer = gl
            .create_buffer()
            .ok_or(EffectError::Resource("vertex buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let vertices = js_sys::Float32Array::from(FULLSCREEN_TRIANGLE.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        gl.vertex_attrib_pointer_with_i32(POSITION_LOCATION, 2, GL::FLOAT, false, 0, 0);
        self.buffer = Some(buffer);

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        Ok(())
    }
}

fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader, EffectError> {
    let kind = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl
        .create_shader(kind)
        .ok_or(EffectError::Resource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(EffectError::ShaderCompile { stage, log })
    }
}

fn link_program(gl: &GL, vert: &WebGlShader, frag: &WebGlShader) -> Result<WebGlProgram, EffectError> {
    let program = gl
        .create_program()
        .ok_or(EffectError::Resource("program"))?;
    gl.attach_shader(&program, vert);
    gl.attach_shader(&program, frag);
    gl.bind_attrib_location(&program, POSITION_LOCATION, "position");
    gl.link_program(&program);
    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(EffectError::ProgramLink(log))
    }
}

impl GpuContext for WebGlContext {
    fn resize(&mut self, width: u32, height: u32) {
        if self.released {
            return;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn upload(&mut self, uniforms: &RayUniforms, dirty: DirtySet) {
        if self.released {
            return;
        }
        for slot in dirty.iter() {
            let location = self.locations[slot.index()].as_ref();
            if location.is_none() {
                // Optimized out by the driver.
                continue;
            }
            match uniforms.get(slot) {
                UniformValue::Float(v) => self.gl.uniform1f(location, v),
                UniformValue::Vec2([x, y]) => self.gl.uniform2f(location, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform3f(location, x, y, z),
            }
        }
    }

    fn draw(&mut self) {
        if self.released {
            return;
        }
        self.gl.clear(GL::COLOR_BUFFER_BIT);
        self.gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        let gl = &self.gl;
        gl.delete_buffer(self.buffer.take().as_ref());
        gl.delete_vertex_array(self.vao.take().as_ref());
        gl.delete_program(self.program.take().as_ref());
        self.locations = Default::default();
        match gl.get_extension("WEBGL_lose_context") {
            Ok(Some(ext)) => ext.unchecked_into::<WebglLoseContext>().lose_context(),
            _ => log::debug!("WEBGL_lose_context unavailable; relying on GC"),
        }
        self.canvas.remove();
    }
}

impl Drop for WebGlContext {
    fn drop(&mut self) {
        self.release();
    }
}
