use serde::{Deserialize, Serialize};

use super::grid::Side;

/// A front/back pair, one value per side of a ballot card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet<T> {
    pub front: T,
    pub back: T,
}

impl<T> Sheet<T> {
    pub fn new(front: T, back: T) -> Self {
        Self { front, back }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }

    pub fn as_ref(&self) -> Sheet<&T> {
        Sheet::new(&self.front, &self.back)
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> Sheet<U> {
        Sheet::new(f(Side::Front, self.front), f(Side::Back, self.back))
    }

    /// Exchanges the front and back values.
    pub fn swap(self) -> Self {
        Sheet::new(self.back, self.front)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Front, &self.front), (Side::Back, &self.back)].into_iter()
    }
}

impl<T> IntoIterator for Sheet<T> {
    type Item = (Side, T);
    type IntoIter = std::array::IntoIter<(Side, T), 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Side::Front, self.front), (Side::Back, self.back)].into_iter()
    }
}
