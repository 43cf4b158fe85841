//! Library events and callback management.

mod callback;
mod dispatcher;
mod event;

pub use callback::{Callback, CallbackRegistry};
pub use dispatcher::EventDispatcher;
pub use event::{Event, SdkEvent};
