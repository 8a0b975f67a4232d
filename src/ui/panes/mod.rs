//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`header`]: page title and caption
//! - [`page`]: the scrolling list of collapsible concept sections
//! - [`source`]: syntax-highlighted snippet source
//! - [`terminal`]: the captured output block under a run trigger
//! - [`status`]: status bar with keybindings and run state
//!
//! Every pane is a stateless render function over borrowed app state; the
//! only thing written back is the page scroll offset.

pub mod header;
pub mod page;
pub mod source;
pub mod status;
pub mod terminal;

pub use header::render_header;
pub use page::{render_page, PageRenderData};
pub use status::render_status_bar;
