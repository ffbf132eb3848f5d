//! Even contiguous splits of the input files and of the key space.
//!
//! Each part gets `total / parts` units and the first `total % parts` parts
//! get one more.

use std::ops::Range;
use std::path::PathBuf;

/// Splits `0..total` into `parts` contiguous ranges. `parts` must be > 0.
pub fn split_even(total: usize, parts: usize) -> Vec<Range<usize>> {
    assert!(parts > 0);
    let size = total / parts;
    let rem = total % parts;
    (0..parts)
        .map(|i| {
            let start = i * size + i.min(rem);
            let len = size + usize::from(i < rem);
            start..start + len
        })
        .collect()
}

/// One block of files per mapper, in list order. Blocks may be empty when
/// there are more mappers than files.
pub fn partition_files(files: &[PathBuf], mappers: usize) -> Vec<Vec<PathBuf>> {
    split_even(files.len(), mappers)
        .into_iter()
        .map(|r| files[r].to_vec())
        .collect()
}

/// One half-open range of `0..key_space` per reducer.
pub fn partition_keyspace(key_space: usize, reducers: usize) -> Vec<Range<i64>> {
    split_even(key_space, reducers)
        .into_iter()
        .map(|r| r.start as i64..r.end as i64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_split(total: usize, parts: usize) {
        let ranges = split_even(total, parts);
        assert_eq!(ranges.len(), parts);
        assert_eq!(ranges.first().unwrap().start, 0);
        assert_eq!(ranges.last().unwrap().end, total);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let min = ranges.iter().map(|r| r.len()).min().unwrap();
        let max = ranges.iter().map(|r| r.len()).max().unwrap();
        assert!(max - min <= 1);
        let larger = total % parts;
        for (i, r) in ranges.iter().enumerate() {
            assert_eq!(r.len(), total / parts + usize::from(i < larger));
        }
    }

    #[test]
    fn split_covers_everything() {
        for total in 0..40 {
            for parts in 1..12 {
                check_split(total, parts);
            }
        }
        for parts in 1..=300 {
            check_split(256, parts);
        }
    }

    #[test]
    fn files_are_assigned_exactly_once() {
        let files: Vec<PathBuf> = (0..7).map(|i| PathBuf::from(format!("f{i}"))).collect();
        let blocks = partition_files(&files, 3);
        let sizes: Vec<_> = blocks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        let flat: Vec<PathBuf> = blocks.concat();
        assert_eq!(flat, files);
    }

    #[test]
    fn more_mappers_than_files() {
        let files = vec![PathBuf::from("a"), PathBuf::from("b")];
        let blocks = partition_files(&files, 4);
        let sizes: Vec<_> = blocks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0]);
    }

    #[test]
    fn keyspace_ranges() {
        assert_eq!(partition_keyspace(256, 1), vec![0..256]);
        assert_eq!(partition_keyspace(256, 2), vec![0..128, 128..256]);
        assert_eq!(partition_keyspace(256, 3), vec![0..86, 86..171, 171..256]);
        let ten = partition_keyspace(256, 10);
        assert_eq!(ten[0], 0..26);
        assert_eq!(ten[5], 130..156);
        assert_eq!(ten[6], 156..181);
        assert_eq!(ten[9].end, 256);
    }
}
