use crate::domain::types::*;
use ndarray::{Array1, Array2};

/// Incidence relation between a pool's local slots and the global asset space
///
/// Equivalent to an `(n, arity)` 0/1 matrix `A` with exactly one 1 per column,
/// located at the global index of that slot. `A · v` lifts a local vector into
/// global space, `Aᵀ · v` restricts a global vector to the pool's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Incidence {
    num_assets: usize,
    local_to_global: Vec<AssetIndex>,
}

impl Incidence {
    /// Builds the incidence relation for one pool
    ///
    /// `pool` is only used to label errors.
    pub fn new(
        pool: usize,
        num_assets: usize,
        local_to_global: &[AssetIndex],
    ) -> ArbitrageResult<Self> {
        for (slot, index) in local_to_global.iter().enumerate() {
            if index.0 >= num_assets {
                return Err(ArbitrageError::AssetIndexOutOfRange {
                    pool,
                    slot,
                    index: index.0,
                    num_assets,
                });
            }
            if local_to_global[..slot].contains(index) {
                return Err(ArbitrageError::DuplicateAsset {
                    pool,
                    index: index.0,
                });
            }
        }

        Ok(Self {
            num_assets,
            local_to_global: local_to_global.to_vec(),
        })
    }

    /// Size of the global index space
    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Number of local slots
    pub fn arity(&self) -> usize {
        self.local_to_global.len()
    }

    /// Global index of a local slot
    pub fn global_index(&self, slot: usize) -> Option<AssetIndex> {
        self.local_to_global.get(slot).copied()
    }

    /// Ordered global indices of the pool's slots
    pub fn local_to_global(&self) -> &[AssetIndex] {
        &self.local_to_global
    }

    /// Dense `(n, arity)` incidence matrix
    pub fn matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((self.num_assets, self.arity()));
        for (slot, index) in self.local_to_global.iter().enumerate() {
            matrix[[index.0, slot]] = 1.0;
        }
        matrix
    }

    /// Lifts a local vector into global space (`A · v`)
    pub fn to_global(&self, local: &[f64]) -> ArbitrageResult<Array1<f64>> {
        if local.len() != self.arity() {
            return Err(ArbitrageError::length_mismatch(
                "local vector",
                self.arity(),
                local.len(),
            ));
        }
        let mut global = Array1::<f64>::zeros(self.num_assets);
        for (index, value) in self.local_to_global.iter().zip(local) {
            global[index.0] += value;
        }
        Ok(global)
    }

    /// Restricts a global vector to the pool's slots (`Aᵀ · v`)
    pub fn to_local(&self, global: &[f64]) -> ArbitrageResult<Vec<f64>> {
        if global.len() != self.num_assets {
            return Err(ArbitrageError::length_mismatch(
                "global vector",
                self.num_assets,
                global.len(),
            ));
        }
        Ok(self
            .local_to_global
            .iter()
            .map(|index| global[index.0])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(raw: &[usize]) -> Vec<AssetIndex> {
        raw.iter().copied().map(AssetIndex).collect()
    }

    #[test]
    fn test_matrix_has_one_entry_per_column() {
        let incidence = Incidence::new(0, 4, &indices(&[2, 0])).unwrap();
        let matrix = incidence.matrix();

        assert_eq!(matrix.dim(), (4, 2));
        assert_eq!(matrix[[2, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 1.0);
        assert_eq!(matrix.sum(), 2.0);
    }

    #[test]
    fn test_out_of_range_index() {
        let err = Incidence::new(3, 4, &indices(&[1, 4])).unwrap_err();
        match err {
            ArbitrageError::AssetIndexOutOfRange {
                pool,
                slot,
                index,
                num_assets,
            } => {
                assert_eq!((pool, slot, index, num_assets), (3, 1, 4, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let err = Incidence::new(0, 4, &indices(&[1, 1])).unwrap_err();
        assert!(matches!(
            err,
            ArbitrageError::DuplicateAsset { pool: 0, index: 1 }
        ));
    }

    #[test]
    fn test_projection_round_trip() {
        let incidence = Incidence::new(0, 4, &indices(&[3, 1])).unwrap();
        let global = incidence.to_global(&[5.0, -2.0]).unwrap();
        assert_eq!(global.to_vec(), vec![0.0, -2.0, 0.0, 5.0]);
        assert_eq!(
            incidence.to_local(global.as_slice().unwrap()).unwrap(),
            vec![5.0, -2.0]
        );
    }

    #[test]
    fn test_global_index_lookup() {
        let incidence = Incidence::new(0, 4, &indices(&[3, 1])).unwrap();
        assert_eq!(incidence.global_index(0), Some(AssetIndex(3)));
        assert_eq!(incidence.global_index(2), None);
    }
}
