use serde::{Deserialize, Serialize};

use crate::domain::Cents;
use crate::storage::{CategoryAggregate, MonthAggregate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: i64,
    pub average: Cents,
    /// Share of the owner's overall spending, 0.0 to 100.0.
    pub percentage: f64,
}

impl CategorySummary {
    pub fn from_aggregates(aggregates: Vec<CategoryAggregate>) -> Vec<Self> {
        let grand_total: i128 = aggregates.iter().map(|a| i128::from(a.total)).sum();

        aggregates
            .into_iter()
            .map(|a| {
                let average = if a.count == 0 { 0 } else { a.total / a.count };
                let percentage = if grand_total <= 0 {
                    0.0
                } else {
                    a.total as f64 / grand_total as f64 * 100.0
                };
                Self {
                    category: a.category,
                    total: a.total,
                    count: a.count,
                    average,
                    percentage,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// "YYYY-MM"
    pub month: String,
    pub total: Cents,
    pub count: i64,
}

impl From<MonthAggregate> for MonthlySummary {
    fn from(a: MonthAggregate) -> Self {
        Self {
            month: a.month,
            total: a.total,
            count: a.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_percentages() {
        let summaries = CategorySummary::from_aggregates(vec![
            CategoryAggregate {
                category: "Food".into(),
                count: 3,
                total: 7500,
            },
            CategoryAggregate {
                category: "Bills".into(),
                count: 1,
                total: 2500,
            },
        ]);

        assert_eq!(summaries[0].average, 2500);
        assert!((summaries[0].percentage - 75.0).abs() < f64::EPSILON);
        assert!((summaries[1].percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_total_has_zero_percentage() {
        let summaries = CategorySummary::from_aggregates(vec![CategoryAggregate {
            category: "Other".into(),
            count: 2,
            total: 0,
        }]);
        assert_eq!(summaries[0].percentage, 0.0);
    }

    #[test]
    fn test_grand_total_past_cents_range() {
        let summaries = CategorySummary::from_aggregates(vec![
            CategoryAggregate {
                category: "Food".into(),
                count: 1,
                total: Cents::MAX,
            },
            CategoryAggregate {
                category: "Bills".into(),
                count: 1,
                total: Cents::MAX,
            },
        ]);
        assert!((summaries[0].percentage - 50.0).abs() < 1e-9);
        assert!((summaries[1].percentage - 50.0).abs() < 1e-9);
    }
}
