//! Terraform side of a TerraSmart run.
//!
//! - `render`: writes a Terraform working directory for a validated DSL
//!   document (Cloudflare provider v4).
//! - `exec`: runs `terraform init/plan/apply/destroy` in that directory.
//! - `runs`: locates and reads run directories under `./terraform`.

pub mod error;
pub mod exec;
pub mod render;
pub mod runs;

pub use error::{RenderError, RenderResult, TerraformError, TerraformResult};
pub use exec::{TerraformExecutor, parse_version, plan_is_destructive, terraform_version};
pub use render::Renderer;
pub use runs::{latest_run_dir, new_run_dir, read_run_document};
