use std::{fs, path::Path};

use reinforce_core::SolverConfig;

use crate::{CompiledMdp, MdpError, MdpSpec};

/// Parse an MDP spec from YAML text. The spec is not validated yet.
pub fn parse_yaml(yaml: &str) -> Result<MdpSpec, MdpError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load an MDP spec from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<MdpSpec, MdpError> {
    let path = path.as_ref();
    log::debug!("loading MDP from {}", path.display());
    parse_yaml(&fs::read_to_string(path)?)
}

/// Load and compile an MDP from a YAML file.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<CompiledMdp, MdpError> {
    load_yaml(path)?.compile()
}

/// Load and compile an MDP, checking probability sums with the solver's tolerance.
pub fn compile_yaml_for(
    path: impl AsRef<Path>,
    config: &SolverConfig,
) -> Result<CompiledMdp, MdpError> {
    load_yaml(path)?.compile_with_tolerance(config.prob_tolerance)
}

/// Serialize and write an MDP spec to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &MdpSpec) -> Result<(), MdpError> {
    fs::write(path, serde_yaml::to_string(spec)?)?;
    Ok(())
}
