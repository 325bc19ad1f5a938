/// Moves a cursor over `len` items by `delta`, wrapping at both ends.
pub fn wrap_step(index: usize, len: usize, delta: isize) -> usize {
    let Ok(len_signed) = isize::try_from(len) else {
        return 0;
    };
    if len_signed == 0 {
        return 0;
    }
    let current = isize::try_from(index.min(len - 1)).unwrap_or(0);
    usize::try_from((current + delta).rem_euclid(len_signed)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_both_directions() {
        assert_eq!(wrap_step(0, 3, -1), 2);
        assert_eq!(wrap_step(2, 3, 1), 0);
        assert_eq!(wrap_step(1, 3, 1), 2);
        assert_eq!(wrap_step(5, 0, 1), 0);
        assert_eq!(wrap_step(9, 3, 0), 2, "out of range index is clamped first");
    }
}
