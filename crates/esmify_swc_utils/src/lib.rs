mod matchers;
pub use matchers::*;
mod namer;
pub use namer::*;
