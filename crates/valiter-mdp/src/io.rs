use std::{fs, path::Path};

use log::{debug, info};

use crate::{CompiledMdp, MdpError, MdpSpec};

/// Read a model file without validating it.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<MdpSpec, MdpError> {
    let path = path.as_ref();
    let spec: MdpSpec = serde_yaml::from_str(&fs::read_to_string(path)?)?;
    debug!("read {} state declarations from {}", spec.states.len(), path.display());
    Ok(spec)
}

/// Read, validate and compile a model file.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<CompiledMdp, MdpError> {
    let path = path.as_ref();
    let compiled = load_yaml(path)?.compile()?;
    info!(
        "compiled model {} with {} states",
        path.display(),
        compiled.state_count()
    );
    Ok(compiled)
}

/// Write `spec` as YAML. Invalid models are rejected before anything touches disk.
pub fn save_yaml(path: impl AsRef<Path>, spec: &MdpSpec) -> Result<(), MdpError> {
    spec.validate()?;
    fs::write(path, serde_yaml::to_string(spec)?)?;
    Ok(())
}
