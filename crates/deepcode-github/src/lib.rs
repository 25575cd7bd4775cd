//! DeepCode GitHub - metadata repository automation
//!
//! Forks the metadata repository, works on a temporary clone and opens a pull
//! request with the staged documents. Git runs as a subprocess with an
//! explicit working directory; the REST API is reached with `reqwest`.

pub mod automation;
pub mod publisher;

pub use automation::GitHubAutomation;
pub use publisher::GitHubPublisher;
