use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use super::shader::ShaderError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads all shared WGSL modules at construction time. Stage sources use
/// `#import desk::module_name::{item}` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules, in dependency order.
const MODULES: &[ModuleDef] = &[ModuleDef {
    source: include_str!("../../assets/shaders/modules/transforms.wgsl"),
    file_path: "modules/transforms.wgsl",
}];

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// [`ShaderError::ImportFailed`] if a shared module does not parse.
    pub fn new() -> Result<Self, ShaderError> {
        let mut composer = Composer::default();

        for m in MODULES {
            let registered = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map(|_| ());
            if let Err(e) = registered {
                return Err(ShaderError::ImportFailed {
                    module: m.file_path.to_owned(),
                    log: e.emit_to_string(&composer),
                });
            }
        }

        Ok(Self { composer })
    }

    /// Compose a shader source into a `naga::Module` without touching the
    /// GPU.
    ///
    /// # Errors
    ///
    /// Returns the composer error (parse failure, unknown import, or
    /// validation failure).
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }

    /// Render a composer error as a human-readable diagnostic.
    pub fn describe(&self, error: &ComposerError) -> String {
        error.emit_to_string(&self.composer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::programs;

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for stage in programs::ALL_STAGES {
            let _ = composer
                .compose_naga(stage.source, stage.file_path)
                .unwrap_or_else(|e| {
                    panic!(
                        "Shader '{}' failed to compose: {}",
                        stage.file_path,
                        composer.describe(&e)
                    )
                });
        }
    }

    #[test]
    fn unknown_import_is_reported() {
        let mut composer = ShaderComposer::new().unwrap();
        let source = "#import desk::missing::{thing}\n\
                      @fragment fn fs_main() -> @location(0) vec4<f32> { return thing; }";
        let err = composer.compose_naga(source, "missing.wgsl").unwrap_err();
        assert!(!composer.describe(&err).is_empty());
    }
}
