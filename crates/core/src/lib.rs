pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod hierarchy;
pub mod human;
pub mod loader;
pub mod logging;
pub mod model;
pub mod palette;
pub mod renderer;
pub mod search;
pub mod transition;

pub use config::ViewConfig;
pub use error::*;
pub use hierarchy::{Hierarchy, LayoutNode, NodeId};
pub use model::*;
pub use renderer::{ArcView, Hit, SunburstRenderer};
