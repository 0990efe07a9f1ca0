mod builder;
mod compiled;
mod error;
mod io;
mod spec;

pub use builder::MdpBuilder;
pub use compiled::{CompiledMdp, MdpAction, MdpState, NULL_ACTION_ID, StateIndex};
pub use error::MdpError;
pub use io::{compile_yaml, compile_yaml_for, load_yaml, parse_yaml, save_yaml};
pub use spec::{ActionSpec, MdpSpec, OutcomeSpec, StateSpec};
