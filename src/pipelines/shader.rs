//! WGSL validation before any pipeline is built.
//!
//! wgpu reports broken shaders through its uncaptured-error callback, long after
//! the call that caused them. Running the module through `naga` first gives the
//! caller a [`ShaderError`] to decide on: each stage is "compiled" (parsed and
//! validated) and the program is "linked" (both entry points exist and every
//! fragment input is produced by the vertex stage).

use naga::{Binding, Module, ShaderStage as NagaStage, valid::{Capabilities, ValidationFlags, Validator}};

use crate::error::{ShaderError, ShaderStage};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Parses and validates `source`, then checks that it links as a vertex/fragment
/// pair.
pub fn validate_program(source: &str) -> Result<(), ShaderError> {
    let module = compile(source)?;
    link(&module)
}

fn compile(source: &str) -> Result<Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage: stage_at(source, e.location(source).map(|l| l.offset)),
        log: e.emit_to_string(source),
    })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage: stage_at(source, e.location(source).map(|l| l.offset)),
            log: e.emit_to_string(source),
        })?;
    Ok(module)
}

fn link(module: &Module) -> Result<(), ShaderError> {
    let vertex = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == NagaStage::Vertex && ep.name == VERTEX_ENTRY)
        .ok_or_else(|| ShaderError::Link {
            log: format!("no vertex entry point named {VERTEX_ENTRY}"),
        })?;
    let fragment = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == NagaStage::Fragment && ep.name == FRAGMENT_ENTRY)
        .ok_or_else(|| ShaderError::Link {
            log: format!("no fragment entry point named {FRAGMENT_ENTRY}"),
        })?;

    let outputs = vertex
        .function
        .result
        .as_ref()
        .map(|result| locations(module, result.binding.as_ref(), result.ty))
        .unwrap_or_default();
    for argument in &fragment.function.arguments {
        for location in locations(module, argument.binding.as_ref(), argument.ty) {
            if !outputs.contains(&location) {
                return Err(ShaderError::Link {
                    log: format!(
                        "fragment input at location {location} is not written by the vertex stage"
                    ),
                });
            }
        }
    }
    Ok(())
}

/// `@location` slots of a binding, looking through struct members.
fn locations(module: &Module, binding: Option<&Binding>, ty: naga::Handle<naga::Type>) -> Vec<u32> {
    match binding {
        Some(Binding::Location { location, .. }) => vec![*location],
        Some(Binding::BuiltIn(_)) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match &m.binding {
                    Some(Binding::Location { location, .. }) => Some(*location),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

/// Errors only carry a source span; anything at or after the `@fragment`
/// attribute belongs to the fragment stage.
fn stage_at(source: &str, offset: Option<u32>) -> ShaderStage {
    match (source.find("@fragment"), offset) {
        (Some(start), Some(offset)) if offset as usize >= start => ShaderStage::Fragment,
        _ => ShaderStage::Vertex,
    }
}
