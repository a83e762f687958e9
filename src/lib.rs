//! # CPE Dictionary
//!
//! Ingests the NVD CPE 2.3 dictionary into a queryable store.
//!
//! The pipeline downloads the gzip-compressed XML feed, parses it into
//! items, unbinds every formatted-string CPE name into a well-formed name,
//! rebinds it to both the legacy URI form and the formatted-string form,
//! keeps only en-US titles, and writes the records in chunks, one
//! transaction per chunk. Stored records are looked up by exact or
//! substring title.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌──────────────────┐   ┌───────────┐
//! │   Fetch   │──▶│   Feed   │──▶│ Naming + Filter  │──▶│   Batch   │
//! │ HTTP+gzip │   │  (XML)   │   │ WFN → URI / FS   │   │  writer   │
//! └───────────┘   └──────────┘   └──────────────────┘   └─────┬─────┘
//!                                                             │
//!                                  ┌──────────┐         ┌─────▼─────┐
//!                                  │  Lookup  │◀────────│   Store   │
//!                                  │exact/like│         │sqlite/mem │
//!                                  └──────────┘         └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cpedict init                         # create database
//! cpedict fetch                        # download and ingest the dictionary
//! cpedict lookup "nginx" --like        # substring title lookup
//! cpedict stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`naming`] | CPE 2.3 name unbinding and binding |
//! | [`feed`] | Dictionary XML parsing |
//! | [`filter`] | en-US title selection |
//! | [`fetch`] | Feed download and gzip decompression |
//! | [`batch`] | Chunked batch insert |
//! | [`ingest`] | Pipeline orchestration |
//! | [`lookup`] | Exact and substring title lookup |
//! | [`store`] | Storage trait and backends |
//! | [`models`] | Persisted record type |
//! | [`error`] | Error taxonomy |
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`logging`] | Tracing subscriber setup |
//! | [`stats`] | Store statistics |

pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod lookup;
pub mod migrate;
pub mod models;
pub mod naming;
pub mod stats;
pub mod store;
