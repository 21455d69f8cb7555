//! Contiguous partitioning of row sets
//!
//! The WAL scenario splits its rows into one shard per worker and each
//! shard into a fixed number of chunks. Every part except the last has
//! `len / parts` rows; the last one also takes the remainder.

/// Chunks each WAL worker splits its shard into
pub const CHUNKS_PER_SHARD: usize = 10;

/// How many chunks (the current one included) are re-read after each insert
pub const VERIFY_DEPTH: usize = 3;

/// Split `rows` into exactly `parts` contiguous slices
///
/// When `rows.len() < parts` the leading slices are empty and the last one
/// holds everything. `parts == 0` yields no slices.
pub fn split_even<T>(rows: &[T], parts: usize) -> Vec<&[T]> {
    if parts == 0 {
        return Vec::new();
    }

    let size = rows.len() / parts;
    let mut out: Vec<&[T]> = (0..parts - 1)
        .map(|i| &rows[i * size..(i + 1) * size])
        .collect();
    out.push(&rows[(parts - 1) * size..]);
    out
}

/// Chunk indexes to re-read after inserting chunk `current`, newest first
pub fn verify_window(current: usize) -> impl Iterator<Item = usize> {
    (current.saturating_sub(VERIFY_DEPTH - 1)..=current).rev()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sums_and_sizes() {
        for n in 0..=257usize {
            let rows: Vec<usize> = (0..n).collect();
            for parts in 1..=12 {
                let split = split_even(&rows, parts);
                assert_eq!(split.len(), parts);
                assert_eq!(split.iter().map(|s| s.len()).sum::<usize>(), n);

                let size = n / parts;
                assert!(split[..parts - 1].iter().all(|s| s.len() == size));
                assert_eq!(split[parts - 1].len(), size + n % parts);

                // Contiguous and in order
                let joined: Vec<usize> = split.concat();
                assert_eq!(joined, rows);
            }
        }
    }

    #[test]
    fn test_split_million_into_workers_and_chunks() {
        let rows: Vec<u32> = (1..=1_000_000).collect();
        let shards = split_even(&rows, 4);
        assert!(shards.iter().all(|s| s.len() == 250_000));

        let chunks = split_even(shards[1], CHUNKS_PER_SHARD);
        assert!(chunks.iter().all(|c| c.len() == 25_000));
        assert_eq!(chunks[0][0], 250_001);
        assert_eq!(chunks[9][24_999], 500_000);
    }

    #[test]
    fn test_split_fewer_rows_than_parts() {
        let rows = [1, 2, 3];
        let split = split_even(&rows, 5);
        assert_eq!(split.len(), 5);
        assert!(split[..4].iter().all(|s| s.is_empty()));
        assert_eq!(split[4], &[1, 2, 3]);

        assert!(split_even(&rows, 0).is_empty());
    }

    #[test]
    fn test_verify_window() {
        assert_eq!(verify_window(0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(verify_window(1).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(verify_window(2).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(verify_window(9).collect::<Vec<_>>(), vec![9, 8, 7]);
    }
}
