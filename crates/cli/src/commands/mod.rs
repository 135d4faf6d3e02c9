pub mod baseline;
pub mod project;
pub mod runs;
pub mod translate;
pub mod util;

pub use baseline::*;
pub use project::*;
pub use runs::*;
pub use translate::*;
pub use util::*;
