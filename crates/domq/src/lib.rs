//! domq
//!
//! jQuery-style queries and mutations over HTML documents.
//!
//! A [`NodeSet`] is an ordered, duplicate-free view over nodes of one
//! document. Queries return new sets; setters and mutators change the
//! tree and return the set they were called on.
//!
//! # Example
//! ```rust
//! use domq::NodeSet;
//!
//! let doc = NodeSet::parse("<ul><li>one</li><li class=\"hot\">two</li></ul>");
//! let hot = doc.find("li.hot")?;
//! assert_eq!(hot.text()?.as_deref(), Some("two"));
//!
//! doc.find("ul")?.append("<li>three</li>")?;
//! assert_eq!(doc.find("li")?.len(), 3);
//! # Ok::<(), domq::Error>(())
//! ```

mod error;
mod node_set;
mod selector;
mod content;
mod query;
mod mutate;
mod access;

pub use error::{Error, Result};
pub use node_set::{Iter, NodeSet};
pub use selector::Selector;
pub use content::{Content, Contents};

pub use domq_dom::{DataRecord, NodeId};
pub use domq_html::ParseOptions;
pub use serde_json::Value;

// Re-export sub-crates for advanced usage
pub use domq_dom as dom;
pub use domq_html as html;
pub use domq_css as css;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
