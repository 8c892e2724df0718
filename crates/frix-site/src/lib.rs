//! Render engine for frix sites.
//!
//! A site is a key document mapping URLs to page templates and content
//! documents, a directory of HTML fragments with optional stylesheets, and a
//! directory of content documents. [`Frix::render`] turns these into pages
//! and one aggregated stylesheet, running registered [`Modifier`]s at the
//! `content`, `header` and `css` extension points.
//!
//! # Example
//!
//! ```no_run
//! use frix_config::Config;
//! use frix_site::Frix;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frix = Frix::new(Config::new("site"))?;
//! frix.add_modifier("content", |html: String| async move { html.replace("\t", "") })?;
//!
//! let rendered = frix.render().await?;
//! for (url, page) in rendered.api.get_all_pages() {
//!     println!("{url} -> {}", page.filename);
//! }
//! let home = rendered.handler.handle("/");
//! # let _ = home;
//! # Ok(())
//! # }
//! ```

mod api;
mod engine;
mod error;
mod handler;
pub mod modifier;
mod page;
mod resolver;

pub use api::QueryApi;
pub use engine::{Frix, Rendered};
pub use error::{ContentLoadError, PageError, SiteError};
pub use handler::{HandlerResponse, RequestHandler};
pub use modifier::{ExtensionPoint, Modifier, ModifierError, ModifierRegistry, Registration};
pub use page::{Page, PageFailure, PageSummary, PageTable};
pub use resolver::{PageSpec, Resolver};
