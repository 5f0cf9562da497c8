//! Hyperparameter grid expansion.
//!
//! Each family's grid is the Cartesian product of its configured value
//! lists, enumerated with parameter names in alphabetical order and the
//! last name varying fastest.

use crate::config::GridConfig;
use crate::models::{
    AdaBoostParams, DecisionTreeParams, GradientBoostingParams, KNeighborsParams, LogisticParams,
    ModelFamily, ModelSpec, RandomForestParams,
};

/// Every candidate for one family. `seed` feeds the randomized estimators.
pub fn expand_family(grids: &GridConfig, family: ModelFamily, seed: u64) -> Vec<ModelSpec> {
    let mut specs = Vec::new();
    match family {
        ModelFamily::RandomForest => {
            let g = &grids.random_forest;
            for &criterion in &g.criterion {
                for &n_estimators in &g.n_estimators {
                    specs.push(ModelSpec::RandomForest(RandomForestParams { n_estimators, criterion, seed }));
                }
            }
        }
        ModelFamily::DecisionTree => {
            for &criterion in &grids.decision_tree.criterion {
                specs.push(ModelSpec::DecisionTree(DecisionTreeParams { criterion, max_depth: None }));
            }
        }
        ModelFamily::GradientBoosting => {
            let g = &grids.gradient_boosting;
            for &learning_rate in &g.learning_rate {
                for &n_estimators in &g.n_estimators {
                    specs.push(ModelSpec::GradientBoosting(GradientBoostingParams { learning_rate, n_estimators }));
                }
            }
        }
        ModelFamily::LogisticRegression => {
            let g = &grids.logistic_regression;
            for &c in &g.c {
                for &max_iter in &g.max_iter {
                    specs.push(ModelSpec::LogisticRegression(LogisticParams { c, max_iter }));
                }
            }
        }
        ModelFamily::AdaBoost => {
            let g = &grids.adaboost;
            for &learning_rate in &g.learning_rate {
                for &n_estimators in &g.n_estimators {
                    specs.push(ModelSpec::AdaBoost(AdaBoostParams { learning_rate, n_estimators }));
                }
            }
        }
        ModelFamily::KNeighbors => {
            for &n_neighbors in &grids.k_neighbors.n_neighbors {
                specs.push(ModelSpec::KNeighbors(KNeighborsParams { n_neighbors }));
            }
        }
    }
    specs
}

/// The full menu in evaluation order.
pub fn model_menu(grids: &GridConfig, seed: u64) -> Vec<(ModelFamily, Vec<ModelSpec>)> {
    ModelFamily::ALL
        .iter()
        .map(|&family| (family, expand_family(grids, family, seed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Criterion;

    #[test]
    fn test_default_menu_sizes() {
        let menu = model_menu(&GridConfig::default(), 42);
        let sizes: Vec<usize> = menu.iter().map(|(_, specs)| specs.len()).collect();
        assert_eq!(sizes, vec![2, 1, 2, 1, 2, 2]);
        assert_eq!(menu[0].0, ModelFamily::RandomForest);
        assert_eq!(menu[5].0, ModelFamily::KNeighbors);
    }

    #[test]
    fn test_cartesian_product_order() {
        let mut grids = GridConfig::default();
        grids.random_forest.criterion = vec![Criterion::Gini, Criterion::Entropy];
        grids.random_forest.n_estimators = vec![4, 8, 16];

        let specs = expand_family(&grids, ModelFamily::RandomForest, 7);
        assert_eq!(specs.len(), 6);
        let pairs: Vec<(Criterion, usize)> = specs
            .iter()
            .map(|s| match s {
                ModelSpec::RandomForest(p) => {
                    assert_eq!(p.seed, 7);
                    (p.criterion, p.n_estimators)
                }
                other => panic!("unexpected spec {other:?}"),
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Criterion::Gini, 4),
                (Criterion::Gini, 8),
                (Criterion::Gini, 16),
                (Criterion::Entropy, 4),
                (Criterion::Entropy, 8),
                (Criterion::Entropy, 16),
            ]
        );
    }

    #[test]
    fn test_empty_list_gives_empty_grid() {
        let mut grids = GridConfig::default();
        grids.k_neighbors.n_neighbors.clear();
        assert!(expand_family(&grids, ModelFamily::KNeighbors, 42).is_empty());
    }
}
