//! # coin-stats
//!
//! Data model for historical coin datasets: validated dates, records with derived
//! day counts, the per-field variable catalog, parsing of multi-valued categorical
//! fields and catalog dates, and the span algebra the coverage engine builds on.
//!
//! ## Records
//!
//! ```rust
//! use coin_stats::{Date, Record};
//!
//! let record = Record::builder()
//!     .text("MINT", "Utrecht / Dordrecht?")
//!     .number("QTTYcoins", 500.0)
//!     .dates(Date::new(1399, 12, 1).unwrap(), Date::new(1400, 1, 31).unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(record.total_days(), 62);
//! assert_eq!(record.total_days_per_year()[&1399], 31);
//! assert!(record.names("MINT", "Dordrecht"));
//! ```
//!
//! ## Span algebra
//!
//! ```rust
//! use coin_stats::{SpanAlgebra, YearSet};
//!
//! let claimed = YearSet::from_span(1400, 1410);
//! let attested = YearSet::from_span(1405, 1406);
//! let rest = claimed.subtract(&attested);
//! assert_eq!(rest[0].length(), 9);
//! ```
//!
//! ## Field catalog
//!
//! | Flag | Typed form |
//! |------|------------|
//! | `date` / `text` / `number` | [`FieldKind`] |
//! | `divideByQtty` | [`ReductionMode::WeightedAverage`] |
//! | `divideByDays` | [`AxisScaling::ProportionalByDays`] |
//! | `variableOfInterest` | [`VariableDescriptor::of_interest`] |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod catalog;
mod date;
mod error;
mod interval;
mod parser;
pub mod record;
mod value;

pub use catalog::{AxisScaling, FieldKind, ReductionMode, VariableCatalog, VariableDescriptor};
pub use date::{days_per_year, span_days, Date};
pub use error::{DataError, DataResult};
pub use interval::{total_length, DateRange, SpanAlgebra, YearSet};
pub use parser::{parse_catalog_date, parse_values};
pub use record::{Record, RecordBuilder};
pub use value::{FieldValue, Token};
