//! Parsing and comparison of .NET version strings, target framework monikers,
//! runtime identifiers, SDK pins and Docker tag components. Pure functions, no I/O.

pub mod channel;
pub mod docker_tag;
pub mod moniker;
pub mod rid;
pub mod sdk_pin;
pub mod semantic;

pub use channel::DotNetVersion;
pub use docker_tag::DockerTag;
pub use moniker::TargetFramework;
pub use rid::RuntimeIdentifier;
pub use sdk_pin::{PinListChange, SdkPin};
pub use semantic::SemanticVersion;
