//! Convenient imports for typical `nqorm` usage.
//!
//! ```ignore
//! use nqorm::prelude::*;
//! ```

pub use crate::{
    Filter, FilterValue, NqClient, NqError, NqResult, Op, QueryResult, QueryRunner, Record, Row,
    Scalar, SortDirection, SqlQb, TableQuery, Transport,
};

#[cfg(feature = "http")]
pub use crate::{ClientConfig, HttpTransport};
