//! Dense user x product matrix math for similarity training

use ndarray::{Array1, Array2, Axis};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::Neighbor;
use crate::storage::models::Interaction;

/// Columns whose standard deviation is below this are treated as constant
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

/// Interaction counts pivoted into rows per user and columns per product.
///
/// Users and products are ordered by id so training is deterministic for a
/// given input.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    users: Vec<String>,
    products: Vec<String>,
    values: Array2<f64>,
}

impl InteractionMatrix {
    /// Pivot interactions; absent pairs are 0 and repeated pairs are summed
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        let users: Vec<String> = interactions
            .iter()
            .map(|i| i.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let products: Vec<String> = interactions
            .iter()
            .map(|i| i.product_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index: HashMap<&str, usize> = users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.as_str(), i))
            .collect();
        let product_index: HashMap<&str, usize> = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let mut values = Array2::<f64>::zeros((users.len(), products.len()));
        for interaction in interactions {
            let row = user_index[interaction.user_id.as_str()];
            let col = product_index[interaction.product_id.as_str()];
            values[[row, col]] += interaction.interaction_count as f64;
        }

        Self {
            users,
            products,
            values,
        }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Standardize, compare, and keep the `k` closest users for everyone
    pub fn nearest_neighbors(mut self, k: usize) -> BTreeMap<String, Vec<Neighbor>> {
        standardize_columns(&mut self.values);
        let similarities = cosine_similarity(&self.values);
        top_neighbors(&self.users, &similarities, k)
    }
}

/// Scale every column to zero mean and unit population variance.
///
/// Constant columns end up all zero instead of dividing by zero.
pub fn standardize_columns(values: &mut Array2<f64>) {
    let Some(means) = values.mean_axis(Axis(0)) else {
        return;
    };
    let stds = values.std_axis(Axis(0), 0.0);

    for (j, mut column) in values.axis_iter_mut(Axis(1)).enumerate() {
        let mean = means[j];
        let scale = if stds[j] < MIN_SCALE { 1.0 } else { stds[j] };
        column.mapv_inplace(|v| (v - mean) / scale);
    }
}

/// Pairwise cosine similarity between rows. A zero row is 0 against everything.
pub fn cosine_similarity(values: &Array2<f64>) -> Array2<f64> {
    let norms: Array1<f64> = values.map_axis(Axis(1), |row| row.dot(&row).sqrt());

    let mut normalized = values.clone();
    for (i, mut row) in normalized.axis_iter_mut(Axis(0)).enumerate() {
        let norm = norms[i];
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        } else {
            row.fill(0.0);
        }
    }

    let mut similarities = normalized.dot(&normalized.t());
    similarities.mapv_inplace(|v| v.clamp(-1.0, 1.0));
    similarities
}

/// For each user, the `k` most similar other users in descending order.
/// Ties keep user id order.
pub fn top_neighbors(
    users: &[String],
    similarities: &Array2<f64>,
    k: usize,
) -> BTreeMap<String, Vec<Neighbor>> {
    let mut table = BTreeMap::new();

    for (i, user) in users.iter().enumerate() {
        let mut neighbors: Vec<Neighbor> = users
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, other)| Neighbor::new(other.clone(), similarities[[i, j]]))
            .collect();
        neighbors.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        neighbors.truncate(k);
        table.insert(user.clone(), neighbors);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ndarray::array;

    fn interaction(user: &str, product: &str, count: u64) -> Interaction {
        Interaction {
            user_id: user.to_string(),
            product_id: product.to_string(),
            interaction_count: count,
            last_interaction: Utc::now(),
        }
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let matrix = InteractionMatrix::from_interactions(&[
            interaction("u2", "p1", 2),
            interaction("u1", "p2", 1),
            interaction("u1", "p1", 3),
        ]);

        assert_eq!(matrix.users(), ["u1".to_string(), "u2".to_string()]);
        assert_eq!(matrix.product_count(), 2);
        assert_eq!(matrix.values(), &array![[3.0, 1.0], [2.0, 0.0]]);
    }

    #[test]
    fn test_standardize_constant_column_is_zero() {
        let mut values = array![[1.0, 5.0], [3.0, 5.0]];
        standardize_columns(&mut values);
        assert_eq!(values, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_standardize_empty_matrix() {
        let mut values = Array2::<f64>::zeros((0, 0));
        standardize_columns(&mut values);
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn test_cosine_zero_row() {
        let values = array![[1.0, 0.0], [0.0, 0.0], [-2.0, 0.0]];
        let sims = cosine_similarity(&values);
        assert!((sims[[0, 0]] - 1.0).abs() < 1e-12);
        assert_eq!(sims[[0, 1]], 0.0);
        assert_eq!(sims[[1, 1]], 0.0);
        assert!((sims[[0, 2]] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_neighbors_excludes_self_and_sorts() {
        let users: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let sims = array![[1.0, 0.2, 0.7], [0.2, 1.0, -0.4], [0.7, -0.4, 1.0]];
        let table = top_neighbors(&users, &sims, 1);

        assert_eq!(table["a"], vec![Neighbor::new("c", 0.7)]);
        assert_eq!(table["b"], vec![Neighbor::new("a", 0.2)]);

        let full = top_neighbors(&users, &sims, 10);
        assert_eq!(full["c"].len(), 2);
        assert!(full["c"].iter().all(|n| n.user_id != "c"));
        assert!(full["c"][0].similarity >= full["c"][1].similarity);
    }

    #[test]
    fn test_similar_buyers_rank_first() {
        let matrix = InteractionMatrix::from_interactions(&[
            interaction("u1", "bread", 3),
            interaction("u1", "croissant", 2),
            interaction("u2", "bread", 2),
            interaction("u2", "croissant", 2),
            interaction("u3", "paint", 4),
        ]);

        let table = matrix.nearest_neighbors(10);
        assert_eq!(table["u1"][0].user_id, "u2");
        assert!(table["u1"][0].similarity > table["u1"][1].similarity);
    }
}
