pub mod assemble;
pub mod format;
pub mod normalize;
pub mod tasks;
pub mod todos;
mod value;

pub use assemble::{
    CONTEXT_TAG, DEFAULT_COMMAND_NAMESPACE, Extras, RenderedContext, assemble, compile,
    welcome_notice, wrap_context,
};
pub use format::{format_bullets, format_list};
pub use normalize::{NormalizedContext, normalize};
pub use tasks::{TaskForest, TaskRecord, render_forest};
pub use todos::{TodoHistory, TodoSnapshot};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
