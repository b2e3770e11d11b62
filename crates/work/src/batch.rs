//! Splitting selections into fixed-size chunks.

use crate::error::ConfigurationError;

/// Split `items` into consecutive chunks of at most `batch_size` items.
///
/// Chunks keep the input order, never overlap, and only the last one may be
/// short. Empty input yields no chunks.
pub fn chunk<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>, ConfigurationError> {
    if batch_size == 0 {
        return Err(ConfigurationError::new("batch size must be greater than zero"));
    }
    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_batch_of_101() {
        let items: Vec<u32> = (0..101).collect();
        let chunks = chunk(&items, 100).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], items[..100]);
        assert_eq!(chunks[1], items[100..]);
    }

    #[test]
    fn test_batch_of_50() {
        let items: Vec<u32> = (0..101).collect();
        let chunks = chunk(&items, 50).unwrap();

        let sizes: Vec<_> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 1]);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        let chunks = chunk::<u32>(&[], 100).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = chunk(&[1, 2, 3], 0).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    proptest! {
        /// Property: chunk count is ceil(len / batch_size) and the chunks
        /// concatenate back to the input
        #[test]
        fn chunks_partition_input_in_order(
            items in proptest::collection::vec(any::<u64>(), 0..500),
            batch_size in 1usize..150,
        ) {
            let chunks = chunk(&items, batch_size).unwrap();

            prop_assert_eq!(chunks.len(), items.len().div_ceil(batch_size));
            prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= batch_size));
            if let Some((last, full)) = chunks.split_last() {
                prop_assert!(full.iter().all(|c| c.len() == batch_size));
                prop_assert!(last.len() <= batch_size);
            }

            let flattened: Vec<u64> = chunks.into_iter().flatten().collect();
            prop_assert_eq!(flattened, items);
        }
    }
}
