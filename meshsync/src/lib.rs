pub mod capture;
pub mod client;
pub mod context;
pub mod error;
pub mod import;
pub mod provision;
pub mod serializer;
pub mod teardown;
pub mod validate;
pub mod wait;

pub use capture::{capture_snapshot, CaptureOptions};
pub use client::{ClientError, ClusterClient, HttpClusterClient};
pub use context::CallContext;
pub use error::{CancelReason, Error, Result};
pub use import::MesheryClient;
pub use provision::{deploy, DeployOptions};
pub use serializer::{load_snapshot, save_snapshot, Format};
pub use teardown::{cleanup, CleanupOptions};
pub use validate::validate;
