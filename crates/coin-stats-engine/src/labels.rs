//! Axis titles for a chart of an aggregate table.

use coin_stats::{ReductionMode, VariableCatalog};

use crate::aggregation::RECORD_COUNT_LABEL;
use crate::request::{AggregationRequest, Axis, ValueSelector};

/// Titles of the two chart axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisLabels {
    /// Horizontal axis title.
    pub x: String,
    /// Vertical axis title.
    pub y: String,
}

/// Derives axis titles from a request and the field titles of the catalog.
pub fn axis_labels(request: &AggregationRequest, catalog: &VariableCatalog) -> AxisLabels {
    let x = match &request.axis {
        Axis::Year => "Year".to_string(),
        Axis::Total => "Total".to_string(),
        Axis::Field(field) => catalog.title(field).to_string(),
    };

    let y = match &request.value {
        ValueSelector::Total => RECORD_COUNT_LABEL.to_string(),
        ValueSelector::Field(field) => {
            let title = catalog.title(field);
            match catalog.reduction(field) {
                ReductionMode::WeightedAverage => format!("Average {}", title.to_lowercase()),
                ReductionMode::Sum => title.to_string(),
            }
        }
    };

    AxisLabels { x, y }
}
