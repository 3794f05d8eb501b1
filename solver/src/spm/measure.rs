use std::cmp::Ordering;

/// A progress measure: either a vector of counters, one per priority, or the
/// top element meaning the vertex is certainly lost.
///
/// Finite measures are compared lexicographically starting from the highest
/// priority, and every finite measure is below `Top`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Measure {
    Finite(Box<[usize]>),
    Top,
}

impl Measure {
    pub fn zero(len: usize) -> Self {
        Measure::Finite(vec![0; len].into_boxed_slice())
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Measure::Top)
    }
}

impl Ord for Measure {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Measure::Top, Measure::Top) => Ordering::Equal,
            (Measure::Top, Measure::Finite(_)) => Ordering::Greater,
            (Measure::Finite(_), Measure::Top) => Ordering::Less,
            (Measure::Finite(a), Measure::Finite(b)) => {
                Iterator::cmp(a.iter().rev(), b.iter().rev())
            }
        }
    }
}

impl PartialOrd for Measure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
