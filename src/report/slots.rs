//! Fixed-capacity, index-addressable list.
//!
//! Backed by an array, so the length always equals the declared capacity.
//! Clearing a slot resets it to the default value instead of removing it.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("slot {index} is out of range (capacity {capacity})")]
pub struct SlotOutOfRange {
    pub index: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotList<T, const N: usize> {
    slots: [T; N],
}

impl<T: Default, const N: usize> Default for SlotList<T, N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T: Default, const N: usize> SlotList<T, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, SlotOutOfRange> {
        self.slots
            .get_mut(index)
            .ok_or(SlotOutOfRange { index, capacity: N })
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), SlotOutOfRange> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<(), SlotOutOfRange> {
        self.set(index, T::default())
    }

    pub fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = T::default());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    /// Fill from a shorter-or-equal list, padding the rest with defaults.
    pub fn from_vec(values: Vec<T>) -> Result<Self, usize> {
        let len = values.len();
        if len > N {
            return Err(len);
        }
        let mut list = Self::default();
        for (slot, value) in list.slots.iter_mut().zip(values) {
            *slot = value;
        }
        Ok(list)
    }
}

impl<T, const N: usize> Index<usize> for SlotList<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.slots[index]
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SlotList<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl<T: Serialize, const N: usize> Serialize for SlotList<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.slots.iter())
    }
}

impl<'de, T, const N: usize> Deserialize<'de> for SlotList<T, N>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(deserializer)?;
        SlotList::from_vec(values).map_err(|len| {
            D::Error::custom(format!("expected at most {N} entries, found {len}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_full_capacity() {
        let list: SlotList<String, 8> = SlotList::new();
        assert_eq!(list.iter().count(), 8);
        assert!(list.iter().all(String::is_empty));
    }

    #[test]
    fn test_set_and_clear_keep_length() {
        let mut list: SlotList<String, 4> = SlotList::new();
        list.set(3, "AHMAD".to_string()).unwrap();
        assert_eq!(list[3], "AHMAD");

        list.clear(3).unwrap();
        assert_eq!(list.as_slice().len(), 4);
        assert_eq!(list[3], "");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut list: SlotList<String, 4> = SlotList::new();
        let err = list.set(4, "X".to_string()).unwrap_err();
        assert_eq!(err, SlotOutOfRange { index: 4, capacity: 4 });
    }

    #[test]
    fn test_short_input_is_padded() {
        let list: SlotList<String, 8> = serde_json::from_str(r#"["A", "B"]"#).unwrap();
        assert_eq!(list.as_slice().len(), 8);
        assert_eq!(list[1], "B");
        assert_eq!(list[7], "");
    }

    #[test]
    fn test_long_input_is_rejected() {
        let result: Result<SlotList<String, 2>, _> = serde_json::from_str(r#"["A", "B", "C"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut list: SlotList<String, 3> = SlotList::new();
        list.set(0, "A".to_string()).unwrap();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["A","",""]"#);
    }
}
