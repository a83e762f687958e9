//! Records persisted by the store.

use serde::{Deserialize, Serialize};

/// One English title of a dictionary entry together with both bindings of
/// its CPE name.
///
/// `cpe_uri` and `cpe_fs` are always produced from the same well-formed
/// name. An entry with several `en-US` titles yields one record per title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedCpe {
    pub title: String,
    #[serde(rename = "cpeURI")]
    pub cpe_uri: String,
    #[serde(rename = "cpeFS")]
    pub cpe_fs: String,
}
