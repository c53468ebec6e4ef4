//! Permutation bookkeeping helpers.

/// Indices that would sort `values` ascending; descending when `reverse`
/// is set. Stable in both directions, so equal weights keep their input
/// order.
pub fn argsort(values: &[f64], reverse: bool) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        let ord = values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
    idx
}

/// Inverse permutations of a row and a column order: the position of each
/// original identifier in the permuted order.
pub fn inverse_perm(rperm: &[usize], cperm: &[usize]) -> (Vec<usize>, Vec<usize>) {
    (invert(rperm), invert(cperm))
}

fn invert(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![usize::MAX; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        debug_assert!(p < perm.len(), "entry out of range");
        debug_assert_eq!(inv[p], usize::MAX, "duplicate entry");
        inv[p] = i;
    }
    inv
}
