//!
//! A chunk/frame pipeline engine for binary transformation units.
//!
//! Data flows through a pipeline as [`Chunk`]s: a binary body plus meta
//! variables. Every pipeline stage is a [`Unit`] that pulls chunks from its
//! upstream stage, transforms the visible ones and yields the results.
//!
//! ## Modules
//!
//! * [`chunk`]: The chunk model and frame-scoped meta variables.
//! * [`oracle`]: Lazily computed chunk properties (size, entropy, digests, ...).
//! * [`args`]: Typed unit arguments and per-chunk deferred expressions.
//! * [`unit`]: The unit contract, the default filter and the unit registry.
//! * [`pipeline`]: Pipeline composition and frame handling.
//! * [`blocks`]: Fixed-width block codec and elementwise block arithmetic.
//! * [`units`]: Units shipped with the crate.
//!
//! ## Example
//!
//! ```rust
//! use refinery::{Chunk, Pipeline};
//! use refinery::blocks::{ArithmeticUnit, BlockConfig};
//! use refinery::args::SeqExpr;
//! use refinery::units::Xor;
//!
//! let xor = ArithmeticUnit::binary(Xor, BlockConfig::default(), SeqExpr::Scalar(0xFF)).unwrap();
//! let pipeline = Pipeline::new().unit(xor);
//!
//! let out = pipeline
//!     .run([Chunk::new(&b"\x00\xFF\x0F"[..])])
//!     .next()
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(out.body.as_ref(), b"\xFF\x00\xF0");
//! ```
//!
//! ## Features
//!
//! * `vectorized` (default): typed lane arrays for block arithmetic.
//! * `async`: read pipeline sources from `tokio` readers as a `futures` stream.
//!

pub mod args;
pub mod blocks;
pub mod chunk;
pub mod error;
pub mod oracle;
pub mod pipeline;
pub mod unit;
pub mod units;

pub use chunk::{Chunk, Value};
pub use error::{Error, Result};
pub use oracle::{Field, MetaOracle, oracle};
pub use pipeline::{Pipeline, run};
pub use unit::{ChunkStream, Mode, Registry, Unit};
