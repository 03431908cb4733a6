// Discovery service integration
//
// Cross-checks the locally connected nodes against the discovery service.

pub mod discovery;

pub use discovery::DiscoveryChecker;
