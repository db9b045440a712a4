//! Remote metadata: container image digests and NuGet package versions.
//!
//! Both are traits so upgraders can be driven by in-memory fakes; the HTTP
//! implementations use `reqwest`'s blocking client and cache per run.

pub mod container;
pub mod digest_cache;
pub mod nuget;

pub use container::{ContainerRegistry, HttpContainerRegistry};
pub use digest_cache::DigestCache;
pub use nuget::{NuGetPackageSource, PackageVersionSource};
