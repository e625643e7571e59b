pub mod drag;
pub mod error;
pub mod layout;
pub mod plan;
pub mod task;
pub mod timeline;

pub use error::TimelineError;
pub use layout::{CollisionPolicy, LayoutConfig, Placement};
pub use plan::Plan;
pub use task::{Category, Lane, Task};
pub use timeline::{ViewMode, VisibleWindow};
