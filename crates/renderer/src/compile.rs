use std::borrow::Cow;
use std::fmt;

use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{
    Binding, Module, Scalar, ScalarKind, ShaderStage, TypeInner, VectorSize,
};

use crate::error::ShaderError;
use crate::geometry::VertexLayout;

const ENTRY_POINT: &str = "main";

/// Pipeline stage a GLSL source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    fn naga(self) -> ShaderStage {
        match self {
            StageKind::Vertex => ShaderStage::Vertex,
            StageKind::Fragment => ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Value type carried by a stage input or output, as far as linking cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    Scalar(ScalarKind, u8),
    Vector(ScalarKind, u8, u8),
    Other,
}

impl InterfaceType {
    fn from_inner(inner: &TypeInner) -> Self {
        match *inner {
            TypeInner::Scalar(Scalar { kind, width }) => InterfaceType::Scalar(kind, width),
            TypeInner::Vector {
                size,
                scalar: Scalar { kind, width },
            } => InterfaceType::Vector(kind, vector_len(size), width),
            _ => InterfaceType::Other,
        }
    }

    fn from_vertex_format(format: wgpu::VertexFormat) -> Self {
        match format {
            wgpu::VertexFormat::Float32 => InterfaceType::Scalar(ScalarKind::Float, 4),
            wgpu::VertexFormat::Float32x2 => InterfaceType::Vector(ScalarKind::Float, 2, 4),
            wgpu::VertexFormat::Float32x3 => InterfaceType::Vector(ScalarKind::Float, 3, 4),
            wgpu::VertexFormat::Float32x4 => InterfaceType::Vector(ScalarKind::Float, 4, 4),
            _ => InterfaceType::Other,
        }
    }
}

fn vector_len(size: VectorSize) -> u8 {
    match size {
        VectorSize::Bi => 2,
        VectorSize::Tri => 3,
        VectorSize::Quad => 4,
    }
}

/// One user-defined (location-bound) input or output of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSlot {
    pub location: u32,
    pub ty: InterfaceType,
}

/// Location-bound inputs and outputs of a stage's entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInterface {
    pub inputs: Vec<InterfaceSlot>,
    pub outputs: Vec<InterfaceSlot>,
}

/// A GLSL stage that parsed and validated cleanly.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: StageKind,
    pub interface: StageInterface,
    source: &'static str,
}

impl CompiledStage {
    pub(crate) fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match self.stage {
                StageKind::Vertex => "triangle vertex",
                StageKind::Fragment => "triangle fragment",
            }),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(self.source),
                stage: self.stage.naga(),
                defines: &[],
            },
        })
    }
}

/// Parses and validates a GLSL stage, then reflects its interface.
pub fn compile_stage(stage: StageKind, source: &'static str) -> Result<CompiledStage, ShaderError> {
    let options = glsl::Options::from(stage.naga());
    let module = glsl::Frontend::default()
        .parse(&options, source)
        .map_err(|err| ShaderError::Compile {
            stage,
            message: err.to_string(),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|err| ShaderError::Validate {
            stage,
            message: err.into_inner().to_string(),
        })?;

    let interface = reflect_interface(&module, stage)?;
    tracing::debug!(
        %stage,
        inputs = interface.inputs.len(),
        outputs = interface.outputs.len(),
        "compiled shader stage"
    );

    Ok(CompiledStage {
        stage,
        interface,
        source,
    })
}

fn reflect_interface(module: &Module, stage: StageKind) -> Result<StageInterface, ShaderError> {
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.stage == stage.naga() && entry.name == ENTRY_POINT)
        .ok_or(ShaderError::MissingEntryPoint { stage })?;

    let mut interface = StageInterface::default();
    for argument in &entry.function.arguments {
        collect_slots(module, argument.ty, argument.binding.as_ref(), &mut interface.inputs);
    }
    if let Some(result) = entry.function.result.as_ref() {
        collect_slots(module, result.ty, result.binding.as_ref(), &mut interface.outputs);
    }
    interface.inputs.sort_by_key(|slot| slot.location);
    interface.outputs.sort_by_key(|slot| slot.location);
    Ok(interface)
}

fn collect_slots(
    module: &Module,
    ty: wgpu::naga::Handle<wgpu::naga::Type>,
    binding: Option<&Binding>,
    slots: &mut Vec<InterfaceSlot>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => slots.push(InterfaceSlot {
            location: *location,
            ty: InterfaceType::from_inner(inner),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_slots(module, member.ty, member.binding.as_ref(), slots);
                }
            }
        }
    }
}

/// Checks the stages against each other and against the vertex buffer layout.
///
/// Every vertex input must be fed by the layout with a matching type, and every
/// fragment input must be written by the vertex stage.
pub fn link(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
    layout: &VertexLayout,
) -> Result<(), ShaderError> {
    let fed = InterfaceType::from_vertex_format(layout.format);
    for input in &vertex.interface.inputs {
        if input.location != layout.location {
            return Err(ShaderError::Link(format!(
                "vertex input at location {} is not fed by the vertex layout (location {})",
                input.location, layout.location
            )));
        }
        if input.ty != fed {
            return Err(ShaderError::Link(format!(
                "vertex input at location {} expects {:?} but the layout provides {:?}",
                input.location, input.ty, layout.format
            )));
        }
    }

    for input in &fragment.interface.inputs {
        let written = vertex
            .interface
            .outputs
            .iter()
            .find(|output| output.location == input.location);
        match written {
            Some(output) if output.ty == input.ty => {}
            Some(output) => {
                return Err(ShaderError::Link(format!(
                    "fragment input at location {} expects {:?} but the vertex stage writes {:?}",
                    input.location, input.ty, output.ty
                )))
            }
            None => {
                return Err(ShaderError::Link(format!(
                    "fragment input at location {} is never written by the vertex stage",
                    input.location
                )))
            }
        }
    }

    Ok(())
}

/// Forwards the location-3 position unchanged into clip space.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 3) in vec3 vp;

void main() {
    gl_Position = vec4(vp, 1.0);
}
";

/// Paints every covered fragment with one opaque purple.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec4 frag_colour;

void main() {
    frag_colour = vec4(0.5, 0.0, 0.5, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const FLOAT3: InterfaceType = InterfaceType::Vector(ScalarKind::Float, 3, 4);
    const FLOAT4: InterfaceType = InterfaceType::Vector(ScalarKind::Float, 4, 4);

    #[test]
    fn vertex_stage_exposes_one_vec3_input_at_location_three() {
        let vertex = compile_stage(StageKind::Vertex, VERTEX_SHADER_GLSL).unwrap();
        assert_eq!(
            vertex.interface.inputs,
            vec![InterfaceSlot {
                location: 3,
                ty: FLOAT3,
            }]
        );
        assert!(vertex.interface.outputs.is_empty());
    }

    #[test]
    fn fragment_stage_writes_one_color_and_reads_nothing() {
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER_GLSL).unwrap();
        assert!(fragment.interface.inputs.is_empty());
        assert_eq!(
            fragment.interface.outputs,
            vec![InterfaceSlot {
                location: 0,
                ty: FLOAT4,
            }]
        );
    }

    #[test]
    fn stock_stages_link_against_the_position_layout() {
        let vertex = compile_stage(StageKind::Vertex, VERTEX_SHADER_GLSL).unwrap();
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER_GLSL).unwrap();
        link(&vertex, &fragment, &VertexLayout::POSITION).unwrap();
    }

    #[test]
    fn syntax_errors_name_the_failing_stage() {
        let err = compile_stage(StageKind::Fragment, "#version 450\nvoid main() { oops }\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: StageKind::Fragment,
                ..
            }
        ));
        assert!(err.to_string().starts_with("failed to compile fragment shader"));
    }

    #[test]
    fn link_rejects_input_outside_the_layout() {
        let vertex = compile_stage(
            StageKind::Vertex,
            "#version 450\nlayout(location = 0) in vec3 vp;\nvoid main() { gl_Position = vec4(vp, 1.0); }\n",
        )
        .unwrap();
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER_GLSL).unwrap();
        let err = link(&vertex, &fragment, &VertexLayout::POSITION).unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)));
    }

    #[test]
    fn link_rejects_mismatched_input_width() {
        let vertex = compile_stage(
            StageKind::Vertex,
            "#version 450\nlayout(location = 3) in vec2 vp;\nvoid main() { gl_Position = vec4(vp, 0.0, 1.0); }\n",
        )
        .unwrap();
        let fragment = compile_stage(StageKind::Fragment, FRAGMENT_SHADER_GLSL).unwrap();
        let err = link(&vertex, &fragment, &VertexLayout::POSITION).unwrap_err();
        assert!(err.to_string().contains("location 3"));
    }

    #[test]
    fn link_rejects_fragment_input_nobody_writes() {
        let vertex = compile_stage(StageKind::Vertex, VERTEX_SHADER_GLSL).unwrap();
        let fragment = compile_stage(
            StageKind::Fragment,
            "#version 450\nlayout(location = 1) in vec4 tint;\nlayout(location = 0) out vec4 c;\nvoid main() { c = tint; }\n",
        )
        .unwrap();
        let err = link(&vertex, &fragment, &VertexLayout::POSITION).unwrap_err();
        assert!(err.to_string().contains("never written"));
    }
}
