pub mod economy;
pub mod industry;
pub mod logging;
pub mod pressure;
pub mod science;
pub mod storyline;
pub mod survival;

pub use economy::*;
pub use industry::*;
pub use logging::*;
pub use pressure::*;
pub use science::*;
pub use storyline::*;
pub use survival::*;
