//! Built-in deployment targets.

pub mod cloudflare;
pub mod node;
pub mod vercel;

pub use cloudflare::CloudflareWorkersTarget;
pub use node::NodeServerTarget;
pub use vercel::VercelNodeTarget;
