use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::{Deref, Index, IndexMut};

/// Conversion between a typed index and its position.
pub trait AsIndex: Copy {
    fn to_usize(&self) -> usize;
    fn from_usize(index: usize) -> Self;
}

/// Per-vertex storage addressed by a typed index.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexedVec<I, T> {
    vec: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: AsIndex, T> IndexedVec<I, T> {
    /// `len` copies of `elem`, one per index.
    pub fn from_elem(elem: T, len: usize) -> Self
    where
        T: Clone,
    {
        vec![elem; len].into()
    }

    /// Appends `value` and returns the index it was stored at.
    pub fn push(&mut self, value: T) -> I {
        let index = I::from_usize(self.vec.len());
        self.vec.push(value);
        index
    }

    pub fn enumerate(&self) -> impl ExactSizeIterator<Item = (I, &T)> {
        self.vec.iter().enumerate().map(|(i, t)| (I::from_usize(i), t))
    }
}

impl<I, T> Deref for IndexedVec<I, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.vec
    }
}

impl<I, T> Default for IndexedVec<I, T> {
    fn default() -> Self {
        Vec::new().into()
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexedVec<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.vec).finish()
    }
}

impl<I: AsIndex, T> Index<I> for IndexedVec<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &T {
        &self.vec[index.to_usize()]
    }
}

impl<I: AsIndex, T> IndexMut<I> for IndexedVec<I, T> {
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.vec[index.to_usize()]
    }
}

impl<I, T> From<Vec<T>> for IndexedVec<I, T> {
    fn from(vec: Vec<T>) -> Self {
        Self { vec, _marker: PhantomData }
    }
}

impl<I, T> IntoIterator for IndexedVec<I, T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.vec.into_iter()
    }
}

/// Position stored as its bitwise complement, leaving zero as the niche
/// for `Option`. `usize::MAX` is not representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(NonZeroUsize);

impl Position {
    pub const fn new(n: usize) -> Self {
        match NonZeroUsize::new(!n) {
            Some(inv) => Self(inv),
            None => panic!("index out of range"),
        }
    }

    pub const fn get(self) -> usize {
        !self.0.get()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0)
    }
}

// The complement reverses the natural order of the stored word.
impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.get().cmp(&other.get())
    }
}

/// Declares a `Copy` index newtype together with a same-named constructor
/// function, so `VertexId(3)` reads like a tuple struct.
macro_rules! new_index {
    ($(#[$($meta:tt)*])* $vis:vis index $ty:ident) => {
        $(#[$($meta)*])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $ty { pos: $crate::index::Position }

        #[allow(non_snake_case)]
        $vis const fn $ty(index: usize) -> $ty {
            $ty { pos: $crate::index::Position::new(index) }
        }

        impl $crate::index::AsIndex for $ty {
            fn to_usize(&self) -> usize {
                self.pos.get()
            }

            fn from_usize(index: usize) -> Self {
                $ty(index)
            }
        }

        impl ::std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "v{}", self.pos.get())
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.pos.get(), f)
            }
        }
    };
}
pub(crate) use new_index;

#[cfg(test)]
mod test {
    use super::*;

    new_index!(index Slot);

    #[test]
    fn positions_keep_their_order() {
        assert!(Slot(0) < Slot(1));
        assert!(Slot(7) < Slot(usize::MAX - 1));
        assert_eq!(Slot(42).to_usize(), 42);
        assert_eq!(std::mem::size_of::<Option<Slot>>(), std::mem::size_of::<usize>());
    }

    #[test]
    fn push_returns_the_new_index() {
        let mut vec = IndexedVec::<Slot, char>::default();
        assert_eq!(vec.push('a'), Slot(0));
        assert_eq!(vec.push('b'), Slot(1));
        vec[Slot(0)] = 'c';
        assert_eq!(vec.enumerate().collect::<Vec<_>>(), [(Slot(0), &'c'), (Slot(1), &'b')]);
        assert_eq!(format!("{vec:?} {:?}", Slot(1)), "['c', 'b'] v1");
    }
}
