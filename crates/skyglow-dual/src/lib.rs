//! Values paired with their derivatives with respect to atmospheric state parameters.

mod dual;
pub use dual::*;
mod optical_depth;
pub use optical_depth::*;
