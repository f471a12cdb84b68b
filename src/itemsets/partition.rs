use tracing::debug;

/// Split `dataset` into contiguous chunks, one per worker.
///
/// Used for transactions and for rule-generation work alike.
///
/// Every chunk holds `n / p` transactions and the last one also takes the
/// `n % p` leftovers. `num_workers` is clamped to the dataset size so that no
/// worker is handed an empty chunk; an empty dataset yields no chunks.
pub fn partition<T>(dataset: &[T], num_workers: usize) -> Vec<&[T]> {
    let n = dataset.len();
    if n == 0 {
        return vec![];
    }

    let num_chunks = num_workers.clamp(1, n);
    if num_chunks < num_workers {
        debug!(
            requested = num_workers,
            used = num_chunks,
            "more workers than items to split, clamping"
        );
    }

    let chunk_size = n / num_chunks;
    (0..num_chunks)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i + 1 == num_chunks { n } else { start + chunk_size };
            &dataset[start..end]
        })
        .collect()
}
