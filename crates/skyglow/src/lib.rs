#![doc(html_no_source)]

mod skyglow;
pub use skyglow::Skyglow;

// Reexport all crates
pub use skyglow_atmosphere;
pub use skyglow_dual;
pub use skyglow_integrator;
pub use skyglow_profiling;
pub use skyglow_raytracing;
pub use skyglow_source;
