//! In-memory columnar numeric table.
//!
//! A [`Table`] is a sparse grid of complex cells stored column by column, where NaN marks a
//! missing cell. On top of plain cell and block access it offers:
//! - NaN-aware reductions (`sum`, `avg`, `med`, `cmp`, ...) over [`VectorIndex`] selections.
//! - Row sorting with hierarchical column keys ([`SortOptions`], [`ColumnKeys`]).
//! - Gap filling of missing cells ([`Table::retouch`]) and convolution smoothing
//!   ([`Table::smooth`]).
//! - Lanczos resampling of blocks through `sciframe-resample` ([`Table::resample`]).
//! - Snapshot transfer between tables and saving through pluggable file writers.

#![forbid(unsafe_code)]

mod column;
mod error;
mod index;
mod resample;
mod retouch;
mod save;
mod smooth;
mod snapshot;
mod sort;
mod stats;
mod table;
mod types;

pub use crate::column::Column;
pub use crate::error::{TableError, WriteError};
pub use crate::index::VectorIndex;
pub use crate::retouch::{fill_gaps, Boundary, RetouchRegion};
pub use crate::save::{
    DefaultWriters, DelimitedTextWriter, TableFile, TableFileWriter, WriterRegistry,
};
pub use crate::smooth::{SmoothFilter, SmoothOptions};
pub use crate::snapshot::TableSnapshot;
pub use crate::sort::{ColumnKeys, SortOptions};
pub use crate::stats::{CmpKind, CmpMode};
pub use crate::table::{Table, TableOptions};
pub use crate::types::{is_missing, AppDir, Value, NAN};
