//! Hook modules: registry and isolated dispatch.

pub mod dispatch;
pub mod registry;

pub use dispatch::{dispatch, DispatchReport, HookError, HookEvent, HookPoint};
pub use registry::{HookRegistry, SessionHook};
