/// Policy for samples addressed outside an array.
///
/// `Skip` and `Constant` never map to an in-range index; callers decide
/// whether the sample is dropped (`Skip`) or replaced (`Constant`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderMode<T> {
    Skip,
    Clamp,
    Constant(T),
    Reflect101,
}

impl<T> BorderMode<T> {
    /// Converts the constant payload, keeping the policy.
    pub fn map_constant<U>(&self, f: impl FnOnce(&T) -> U) -> BorderMode<U> {
        match self {
            Self::Skip => BorderMode::Skip,
            Self::Clamp => BorderMode::Clamp,
            Self::Constant(v) => BorderMode::Constant(f(v)),
            Self::Reflect101 => BorderMode::Reflect101,
        }
    }

    pub fn constant(&self) -> Option<&T> {
        match self {
            Self::Constant(v) => Some(v),
            _ => None,
        }
    }
}

pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Skip | BorderMode::Constant(_) => None,
        BorderMode::Clamp => {
            if len == 0 {
                return None;
            }
            if i < 0 { Some(0) } else { Some(len - 1) }
        }
        BorderMode::Reflect101 => {
            if len == 0 {
                return None;
            }
            if len == 1 {
                return Some(0);
            }

            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                Some(r)
            } else {
                Some((2 * len - 2) - r)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BorderMode, map_index};

    #[test]
    fn clamp_mapping_handles_negative_and_overflow() {
        let mode = BorderMode::<u8>::Clamp;

        assert_eq!(map_index(-3, 5, &mode), Some(0));
        assert_eq!(map_index(-1, 5, &mode), Some(0));
        assert_eq!(map_index(0, 5, &mode), Some(0));
        assert_eq!(map_index(4, 5, &mode), Some(4));
        assert_eq!(map_index(5, 5, &mode), Some(4));
        assert_eq!(map_index(99, 5, &mode), Some(4));
        assert_eq!(map_index(0, 0, &mode), None);
    }

    #[test]
    fn skip_and_constant_only_map_in_range() {
        for mode in [BorderMode::Skip, BorderMode::Constant(7u8)] {
            assert_eq!(map_index(-1, 4, &mode), None);
            assert_eq!(map_index(4, 4, &mode), None);
            assert_eq!(map_index(2, 4, &mode), Some(2));
        }
    }

    #[test]
    fn reflect101_len1_len2_len5() {
        let mode = BorderMode::<u8>::Reflect101;

        for i in -8..=8 {
            assert_eq!(map_index(i, 1, &mode), Some(0));
        }

        let expected_len2 = [0, 1, 0, 1, 0, 1, 0, 1, 0];
        for (offset, expected) in (-4..=4).zip(expected_len2) {
            assert_eq!(map_index(offset, 2, &mode), Some(expected));
        }

        let cases_len5 = [
            (-7, 1),
            (-5, 3),
            (-4, 4),
            (-1, 1),
            (0, 0),
            (4, 4),
            (5, 3),
            (7, 1),
        ];
        for (i, expected) in cases_len5 {
            assert_eq!(map_index(i, 5, &mode), Some(expected));
        }
    }

    #[test]
    fn map_constant_keeps_policy() {
        let m = BorderMode::Constant(3u8).map_constant(|&v| f64::from(v) * 0.5);
        assert_eq!(m, BorderMode::Constant(1.5));
        assert_eq!(
            BorderMode::<u8>::Reflect101.map_constant(|&v| v as f64),
            BorderMode::Reflect101
        );
        assert_eq!(BorderMode::Constant(2i32).constant(), Some(&2));
        assert_eq!(BorderMode::<i32>::Skip.constant(), None);
    }
}
