//! per-channel difference kernels over packed channel buffers (see `ColorSpace::convert`).
//! integer accumulation keeps results exact and independent of how callers
//! spread evaluations over threads.

/// sum of absolute differences (L1 / manhattan)
#[inline]
pub fn sum_abs_diff(target: &[u8], current: &[u8]) -> u64 {
    profiling::scope!("sum_abs_diff");
    debug_assert_eq!(target.len(), current.len());

    // chunked so the compiler can vectorize the inner loop
    let mut total = 0u64;
    for (t, c) in target.chunks(64).zip(current.chunks(64)) {
        let mut chunk = 0u32;
        for (&a, &b) in t.iter().zip(c) {
            chunk += (a as i32 - b as i32).unsigned_abs();
        }
        total += chunk as u64;
    }
    total
}

/// sum of squared differences (L2²)
#[inline]
pub fn sum_sq_diff(target: &[u8], current: &[u8]) -> u64 {
    profiling::scope!("sum_sq_diff");
    debug_assert_eq!(target.len(), current.len());

    let mut total = 0u64;
    for (t, c) in target.chunks(64).zip(current.chunks(64)) {
        let mut chunk = 0u64;
        for (&a, &b) in t.iter().zip(c) {
            let d = a as i64 - b as i64;
            chunk += (d * d) as u64;
        }
        total += chunk;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_buffers_score_zero() {
        let a: Vec<u8> = (0..=255).collect();
        assert_eq!(sum_abs_diff(&a, &a), 0);
        assert_eq!(sum_sq_diff(&a, &a), 0);
    }

    #[test]
    fn test_known_differences() {
        let a = [0u8, 10, 255];
        let b = [5u8, 0, 250];
        assert_eq!(sum_abs_diff(&a, &b), 5 + 10 + 5);
        assert_eq!(sum_sq_diff(&a, &b), 25 + 100 + 25);
    }

    #[test]
    fn test_worst_case_does_not_overflow_chunk() {
        // 64 channels fully apart in one chunk: 64 * 255 fits easily, 64 * 255² needs u64
        let a = vec![0u8; 1000];
        let b = vec![255u8; 1000];
        assert_eq!(sum_abs_diff(&a, &b), 1000 * 255);
        assert_eq!(sum_sq_diff(&a, &b), 1000 * 255 * 255);
    }
}
