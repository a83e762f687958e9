//! CPE 2.3 naming: well-formed names and their two string bindings.
//!
//! ```text
//!  cpe:2.3:a:nginx:nginx:1.2:*:*:*:*:*:*:*   ──unbind_fs──▶  WellFormedName
//!                                                              │
//!                      ┌──────────────bind_to_fs───────────────┤
//!                      ▼                                       ▼
//!  cpe:2.3:a:nginx:nginx:1.2:*:*:*:*:*:*:*        cpe:/a:nginx:nginx:1.2
//! ```
//!
//! [`bind_to_fs`] is a left-inverse of [`unbind_fs`] for canonical
//! formatted strings. The URI form cannot hold the four extended
//! attributes individually and packs them into the edition component.

pub mod fs;
pub mod uri;
pub mod wfn;

pub use fs::{bind_to_fs, unbind_fs};
pub use uri::{bind_to_uri, unbind_uri};
pub use wfn::{Attribute, AttributeValue, WellFormedName};
