pub mod drill;
pub mod enums;
pub mod policy;

pub use drill::*;
pub use enums::*;
pub use policy::*;
