use serde::{Deserialize, Serialize};

use crate::catalog::PowerSource;
use crate::category::CategoryGroup;
use crate::compatibility::SelectedParts;

/// Share of the budget at which a build counts as approaching it.
pub const APPROACHING_BUDGET_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub name: String,
    pub cost: f64,
}

/// Spend on one category group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub category: CategoryGroup,
    pub label: String,
    pub cost: f64,
    /// Percent of the build total, 0 when the build costs nothing.
    pub percentage: f64,
    pub parts: Vec<CostLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Under,
    Approaching,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub status: BudgetState,
    /// Capped at 100 for display.
    pub percentage: f64,
    pub remaining: f64,
    pub overage: f64,
}

/// Power source price plus every selected part's price. Unpriced items count
/// as zero.
pub fn total_cost(power_source: Option<&PowerSource>, parts: &SelectedParts) -> f64 {
    let base = power_source.and_then(PowerSource::price).unwrap_or(0.0);
    parts
        .iter()
        .fold(base, |total, part| total + part.price.unwrap_or(0.0))
}

/// Spend grouped by category group, most expensive group first.
///
/// The power source gets its own entry, and only when it has a price.
pub fn cost_breakdown(power_source: Option<&PowerSource>, parts: &SelectedParts) -> Vec<CostBreakdown> {
    let total = total_cost(power_source, parts);
    let mut groups: Vec<CostBreakdown> = Vec::new();

    if let Some(source) = power_source {
        if let Some(price) = source.price().filter(|p| *p != 0.0) {
            groups.push(CostBreakdown {
                category: CategoryGroup::PowerSource,
                label: CategoryGroup::PowerSource.label().to_string(),
                cost: price,
                percentage: 0.0,
                parts: vec![CostLine {
                    name: source.name().to_string(),
                    cost: price,
                }],
            });
        }
    }

    for part in parts.iter() {
        let group = part.category.group();
        let cost = part.price.unwrap_or(0.0);
        let line = CostLine {
            name: part.name.clone(),
            cost,
        };

        match groups.iter_mut().find(|g| g.category == group) {
            Some(existing) => {
                existing.cost += cost;
                existing.parts.push(line);
            }
            None => groups.push(CostBreakdown {
                category: group,
                label: group.label().to_string(),
                cost,
                percentage: 0.0,
                parts: vec![line],
            }),
        }
    }

    for group in &mut groups {
        group.percentage = if total > 0.0 {
            group.cost * 100.0 / total
        } else {
            0.0
        };
    }

    groups.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    groups
}

/// Where a build stands against a budget. `None` without a positive budget.
pub fn budget_status(total: f64, budget: Option<f64>) -> Option<BudgetStatus> {
    let budget = budget.filter(|b| b.is_finite() && *b > 0.0)?;

    let percentage = total * 100.0 / budget;
    let status = if percentage > 100.0 {
        BudgetState::Over
    } else if percentage >= APPROACHING_BUDGET_PERCENT {
        BudgetState::Approaching
    } else {
        BudgetState::Under
    };

    Some(BudgetStatus {
        status,
        percentage: percentage.min(100.0),
        remaining: (budget - total).max(0.0),
        overage: (total - budget).max(0.0),
    })
}
