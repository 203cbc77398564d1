//! Red List Index for a single set of category weights
//!
//! RLI = 1 - sum(weights) / (max_weight × count)
//!
//! 1.0 means every species is Least Concern, 0.0 means every species is
//! at the maximum weight (Extinct).

use crate::categories::CategoryWeightTable;
use crate::error::{Result, RliError};

/// Compute the Red List Index for one partition's weights.
///
/// Every weight must lie in `[0, table.max_weight()]`. No rounding is
/// applied.
pub fn red_list_index(weights: &[i64], table: &CategoryWeightTable) -> Result<f64> {
    if weights.is_empty() {
        return Err(RliError::EmptyWeights);
    }

    let max_weight = table.max_weight();
    for (index, &w) in weights.iter().enumerate() {
        if w < 0 {
            return Err(RliError::InvalidWeight {
                index,
                reason: format!("negative value {}", w),
            });
        }
        if w > max_weight {
            return Err(RliError::InvalidWeight {
                index,
                reason: format!("value {} greater than EX ({})", w, max_weight),
            });
        }
    }

    let sum: i64 = weights.iter().sum();
    Ok(1.0 - (sum as f64 / (max_weight as f64 * weights.len() as f64)))
}
