pub mod drag;
pub mod hit;
pub mod input;
pub mod observer;
pub mod session;
pub mod viewport;

pub use drag::NodeDragController;
pub use hit::{content_bounds, hit_test, hit_test_rect};
pub use input::InputEvent;
pub use observer::{DiagramObserver, Observers, SubscriptionId};
pub use session::{DUPLICATE_OFFSET, EditorSession, Gesture};
pub use viewport::{InteractionMode, ViewportEngine};
