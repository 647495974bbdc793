// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::{self, Any};
use std::fmt;

/// A type-erased value of any `Send` type, remembering its type name.
///
/// Downcasts are checked: asking for the wrong type yields `None` (or gives the
/// payload back), never a reinterpretation of the bytes.
pub struct Payload {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Payload {
    /// Wraps `value`.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// A payload holding `()`, for metadata-only entries.
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Returns `true` if the payload holds `()`.
    pub fn is_empty(&self) -> bool {
        self.is::<()>()
    }

    /// Returns `true` if the payload holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the value as a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Mutably borrows the value as a `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Takes the value out as a `T`, or hands the payload back untouched.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }

    /// The name of the stored type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// One unit of a [`MailboxQueue`](super::MailboxQueue): metadata of the
/// queue's type `M` and a payload of any type.
///
/// Once detached from its queue an entry is an ordinary owned value; dropping
/// it drops the payload.
#[derive(Debug)]
pub struct Entry<M = ()> {
    meta: M,
    payload: Payload,
}

impl<M> Entry<M> {
    /// Builds an entry from its parts.
    pub fn new(meta: M, payload: Payload) -> Self {
        Self { meta, payload }
    }

    /// The entry's metadata.
    pub fn meta(&self) -> &M {
        &self.meta
    }

    /// Mutable access to the metadata.
    pub fn meta_mut(&mut self) -> &mut M {
        &mut self.meta
    }

    /// The type-erased payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Mutable access to the type-erased payload.
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Returns `true` if the payload holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Borrows the payload as a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.payload.get::<T>()
    }

    /// Mutably borrows the payload as a `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.get_mut::<T>()
    }

    /// Splits the entry into metadata and payload.
    pub fn into_parts(self) -> (M, Payload) {
        (self.meta, self.payload)
    }

    /// Takes the payload out as a `T`, or hands the entry back untouched.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { meta, payload } = self;
        payload
            .downcast::<T>()
            .map_err(|payload| Self { meta, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_checked_downcast() {
        let payload = Payload::new(42u32);
        assert!(payload.is::<u32>());
        assert!(!payload.is::<i32>());
        assert_eq!(payload.get::<u32>(), Some(&42));
        assert_eq!(payload.get::<String>(), None);
        assert!(payload.type_name().contains("u32"));

        let payload = payload.downcast::<String>().unwrap_err();
        assert_eq!(payload.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::empty();
        assert!(payload.is_empty());
        assert!(!Payload::new(1u8).is_empty());
    }

    #[test]
    fn test_entry_downcast_keeps_meta_on_mismatch() {
        let entry = Entry::new("meta", Payload::new(String::from("value")));
        let entry = entry.downcast::<u64>().unwrap_err();
        assert_eq!(*entry.meta(), "meta");
        assert_eq!(entry.downcast::<String>().unwrap(), "value");
    }
}
