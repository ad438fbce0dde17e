use std::{fmt::Display, ops::{ BitOr, BitOrAssign, Index, IndexMut, Range }};

/// Slot occupancy of one fiber. `true` means the slot is in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatrix(Vec<bool>);

impl BitOr for &StateMatrix {
    type Output = StateMatrix;

    fn bitor(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.slot_count(), rhs.slot_count());
        StateMatrix(
            self.0.iter().zip(rhs.0.iter()).map(|(&self_s, &rhs_s)| self_s | rhs_s).collect()
        )
    }
}
impl BitOrAssign<&StateMatrix> for StateMatrix {
    fn bitor_assign(&mut self, rhs: &StateMatrix) {
        debug_assert_eq!(self.slot_count(), rhs.slot_count());
        for (self_s, &rhs_s) in self.0.iter_mut().zip(rhs.0.iter()) {
            *self_s |= rhs_s;
        }
    }
}

impl Index<usize> for StateMatrix {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for StateMatrix {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Index<Range<usize>> for StateMatrix {
    type Output = [bool];

    fn index(&self, index: Range<usize>) -> &Self::Output {
        &self.0[index]
    }
}
impl IndexMut<Range<usize>> for StateMatrix {
    fn index_mut(&mut self, index: Range<usize>) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl StateMatrix {
    pub fn new(slots: usize) -> StateMatrix {
        Self(vec![false; slots])
    }

    pub fn slot_count(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, bool> {
        self.0.iter()
    }

    /// Lowest start index of `size` contiguous free slots.
    pub fn get_empty_contiguous_slots(&self, size: usize) -> Option<usize> {
        if size == 0 || size > self.slot_count() {
            return None;
        }

        let mut target_state_matrix = self.clone();
        let mut state_matrix_for_shift = self.clone();

        for _ in 0..size - 1 {
            state_matrix_for_shift.l_shift();
            target_state_matrix |= &state_matrix_for_shift;
        }

        target_state_matrix.0.iter().position(|x| !*x)
    }

    /// Moves every slot one index down; the vacated tail counts as occupied.
    fn l_shift(&mut self) {
        let mut prev_s = true;
        for s in self.0.iter_mut().rev() {
            std::mem::swap(&mut *s, &mut prev_s);
        }
    }
}

impl Display for StateMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for element in &self.0 {
            if *element {
                write!(f, "█")?;
            } else {
                write!(f, "▏")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(slots: usize, used: &[usize]) -> StateMatrix {
        let mut state_matrix = StateMatrix::new(slots);
        for &s in used {
            state_matrix[s] = true;
        }
        state_matrix
    }

    #[test]
    fn first_fit_on_an_empty_fiber_is_slot_zero() {
        let state_matrix = StateMatrix::new(8);
        assert_eq!(state_matrix.get_empty_contiguous_slots(3), Some(0));
        assert_eq!(state_matrix.get_empty_contiguous_slots(8), Some(0));
        assert_eq!(state_matrix.get_empty_contiguous_slots(9), None);
        assert_eq!(state_matrix.get_empty_contiguous_slots(0), None);
    }

    #[test]
    fn first_fit_skips_gaps_that_are_too_narrow() {
        // ▏█▏▏█▏▏▏
        let state_matrix = occupied(8, &[1, 4]);
        assert_eq!(state_matrix.get_empty_contiguous_slots(1), Some(0));
        assert_eq!(state_matrix.get_empty_contiguous_slots(2), Some(2));
        assert_eq!(state_matrix.get_empty_contiguous_slots(3), Some(5));
        assert_eq!(state_matrix.get_empty_contiguous_slots(4), None);
    }

    #[test]
    fn union_blocks_slots_used_on_any_fiber() {
        let a = occupied(6, &[0, 1]);
        let b = occupied(6, &[3]);
        let union = &a | &b;

        assert_eq!(union.iter().filter(|s| **s).count(), 3);
        assert_eq!(union.get_empty_contiguous_slots(1), Some(2));
        assert_eq!(union.get_empty_contiguous_slots(2), Some(4));
        assert_eq!(union.get_empty_contiguous_slots(3), None);
    }

    #[test]
    fn display_draws_one_glyph_per_slot() {
        assert_eq!(occupied(3, &[1]).to_string(), "▏█▏");
    }
}
