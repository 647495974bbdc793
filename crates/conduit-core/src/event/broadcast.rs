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

use crate::queue::{Entry, MailboxQueue, Payload};
use crate::sync::lock;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

type Mailbox<M> = Mutex<MailboxQueue<M>>;

/// Fans messages out to every live [`Listener`].
///
/// The broadcaster only holds weak references to listener mailboxes, so it
/// never keeps a mailbox alive on its own. Mailboxes whose listener is gone
/// are pruned lazily, during the next [`post`](Self::post).
///
/// Lock order: the registration list is always locked before an individual
/// mailbox, never the other way around.
pub struct Broadcaster<M = ()> {
    mailboxes: Mutex<Vec<Weak<Mailbox<M>>>>,
}

impl<M: Send + 'static> Broadcaster<M> {
    /// Creates a broadcaster with no listener.
    pub fn new() -> Self {
        Self {
            mailboxes: Mutex::new(Vec::new()),
        }
    }

    /// Creates a fresh mailbox, registers it and returns its listener.
    ///
    /// The listener receives every message posted after this call returns
    /// and none posted before.
    pub fn subscribe(&self) -> Listener<M> {
        let mailbox = Arc::new(Mutex::new(MailboxQueue::new()));
        lock(&self.mailboxes).push(Arc::downgrade(&mailbox));
        Listener {
            mailbox: Some(mailbox),
        }
    }

    /// Delivers a clone of `message` with a clone of `meta` to every live
    /// listener and returns how many received it.
    pub fn post<T>(&self, meta: M, message: T) -> usize
    where
        M: Clone,
        T: Any + Send + Clone,
    {
        self.post_with(|| meta.clone(), || message.clone())
    }

    /// Like [`post`](Self::post), for values that are built once per listener
    /// instead of cloned.
    pub fn post_with<T, FM, FT>(&self, mut meta: FM, mut message: FT) -> usize
    where
        T: Any + Send,
        FM: FnMut() -> M,
        FT: FnMut() -> T,
    {
        let mut mailboxes = lock(&self.mailboxes);
        let mut delivered = 0;
        mailboxes.retain(|weak| match weak.upgrade() {
            Some(mailbox) => {
                lock(&mailbox).push_payload(meta(), Payload::new(message()));
                delivered += 1;
                true
            }
            None => false,
        });
        delivered
    }

    /// The number of live listeners. Orphaned mailboxes are pruned on the way.
    pub fn listener_count(&self) -> usize {
        let mut mailboxes = lock(&self.mailboxes);
        mailboxes.retain(|weak| weak.strong_count() > 0);
        mailboxes.len()
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        lock(&self.mailboxes).len()
    }
}

impl<M: Send + 'static> Default for Broadcaster<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for Broadcaster<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("registered", &lock(&self.mailboxes).len())
            .finish()
    }
}

/// The receiving end of a [`Broadcaster`] subscription.
///
/// Owns the only strong reference to its mailbox. Dropping the listener, or
/// calling [`unsubscribe`](Self::unsubscribe), orphans the mailbox.
pub struct Listener<M = ()> {
    mailbox: Option<Arc<Mailbox<M>>>,
}

impl<M: Send + 'static> Listener<M> {
    /// A listener attached to nothing. [`receive`](Self::receive) always returns `None`.
    pub fn detached() -> Self {
        Self { mailbox: None }
    }

    /// Drops the current subscription, if any, and subscribes to `source`.
    pub fn listen(&mut self, source: &Broadcaster<M>) {
        *self = source.subscribe();
    }

    /// Drops the current subscription. Pending events are discarded.
    pub fn unsubscribe(&mut self) {
        self.mailbox = None;
    }

    /// Returns `true` while the listener is attached to a broadcaster.
    pub fn is_subscribed(&self) -> bool {
        self.mailbox.is_some()
    }

    /// Pops the oldest pending event without blocking.
    pub fn receive(&self) -> Option<Event<M>> {
        let mailbox = self.mailbox.as_ref()?;
        lock(mailbox).pop_front().map(Event::from)
    }

    /// Pops pending events one at a time until the mailbox is empty.
    pub fn drain(&self) -> impl Iterator<Item = Event<M>> + '_ {
        std::iter::from_fn(move || self.receive())
    }

    /// The number of events waiting in the mailbox.
    pub fn pending(&self) -> usize {
        self.mailbox.as_ref().map_or(0, |mailbox| lock(mailbox).len())
    }
}

impl<M> Default for Listener<M> {
    fn default() -> Self {
        Self { mailbox: None }
    }
}

impl<M> fmt::Debug for Listener<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("subscribed", &self.mailbox.is_some())
            .finish()
    }
}

/// An event detached from a listener's mailbox.
#[derive(Debug)]
pub struct Event<M = ()> {
    entry: Entry<M>,
}

impl<M> Event<M> {
    /// Returns `true` if the event carries a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.entry.is::<T>()
    }

    /// Borrows the message as a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entry.get::<T>()
    }

    /// Mutably borrows the message as a `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.entry.get_mut::<T>()
    }

    /// The metadata posted alongside the message.
    pub fn meta(&self) -> &M {
        self.entry.meta()
    }

    /// The name of the message type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.entry.payload().type_name()
    }

    /// Takes the message out as a `T`, or hands the event back untouched.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        self.entry.downcast::<T>().map_err(Event::from)
    }

    /// Unwraps the underlying queue entry.
    pub fn into_entry(self) -> Entry<M> {
        self.entry
    }
}

impl<M> From<Entry<M>> for Event<M> {
    fn from(entry: Entry<M>) -> Self {
        Self { entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    /// A local, self-contained event enum for testing purposes.
    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        WindowResized { width: u32, height: u32 },
        KeyPressed { key_code: String },
        ShutdownRequested,
    }

    fn dummy_key_event() -> TestEvent {
        TestEvent::KeyPressed {
            key_code: "Test".to_string(),
        }
    }

    #[test]
    fn receive_empty() {
        let source = Broadcaster::<()>::new();
        let listener = source.subscribe();
        assert!(listener.receive().is_none());
        assert_eq!(listener.pending(), 0);
        assert_eq!(source.listener_count(), 1);
    }

    #[test]
    fn post_receive_multiple_events_in_order() {
        let source = Broadcaster::<()>::new();
        let listener = source.subscribe();

        let event1 = TestEvent::WindowResized {
            width: 1,
            height: 1,
        };
        let event2 = dummy_key_event();
        let event3 = TestEvent::ShutdownRequested;

        source.post((), event1.clone());
        source.post((), 7u64);
        source.post((), event2.clone());
        source.post((), event3.clone());

        let received: Vec<Event> = listener.drain().collect();
        assert_eq!(received.len(), 4);
        assert_eq!(received[0].get::<TestEvent>(), Some(&event1));
        assert!(received[1].is::<u64>());
        assert_eq!(received[2].get::<TestEvent>(), Some(&event2));
        assert_eq!(received[3].get::<TestEvent>(), Some(&event3));
        assert!(listener.receive().is_none());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let source = Broadcaster::<()>::new();
        let listener = source.subscribe();
        source.post((), dummy_key_event());

        let event = listener.receive().unwrap();
        assert!(!event.is::<String>());
        assert!(event.get::<String>().is_none());
        let event = event.into_inner::<String>().unwrap_err();
        assert_eq!(event.into_inner::<TestEvent>().unwrap(), dummy_key_event());
    }

    #[test]
    fn late_subscriber_misses_earlier_posts() {
        let source = Broadcaster::<()>::new();
        let early = source.subscribe();
        for i in 0..5u32 {
            source.post((), i);
        }

        let late = source.subscribe();
        assert!(late.receive().is_none());

        source.post((), 99u32);
        assert_eq!(late.receive().and_then(|e| e.into_inner::<u32>().ok()), Some(99));
        assert_eq!(early.pending(), 6);
    }

    #[test]
    fn dropped_listener_is_pruned_on_next_post() {
        let source = Broadcaster::<()>::new();
        let listener1 = source.subscribe();
        let listener2 = source.subscribe();

        assert_eq!(source.post((), "M1"), 2);
        drop(listener1);
        assert_eq!(source.registered(), 2);

        assert_eq!(source.post((), "M2"), 1);
        assert_eq!(source.registered(), 1);

        let first = listener2.receive().unwrap();
        let second = listener2.receive().unwrap();
        assert_eq!(first.get::<&str>(), Some(&"M1"));
        assert_eq!(second.get::<&str>(), Some(&"M2"));
    }

    #[test]
    fn unsubscribe_and_listen_again() {
        let source = Broadcaster::<()>::new();
        let mut listener = source.subscribe();
        source.post((), 1u8);

        listener.unsubscribe();
        assert!(!listener.is_subscribed());
        assert!(listener.receive().is_none());
        assert_eq!(source.listener_count(), 0);

        listener.listen(&source);
        source.post((), 2u8);
        assert_eq!(listener.receive().and_then(|e| e.into_inner::<u8>().ok()), Some(2));
    }

    #[test]
    fn detached_listener_receives_nothing() {
        let listener = Listener::<()>::detached();
        assert!(!listener.is_subscribed());
        assert!(listener.receive().is_none());
        assert_eq!(listener.pending(), 0);
    }

    #[test]
    fn meta_travels_with_each_message() {
        let source = Broadcaster::<&'static str>::new();
        let listener = source.subscribe();
        source.post("resize", (800u32, 600u32));
        let event = listener.receive().unwrap();
        assert_eq!(*event.meta(), "resize");
        assert_eq!(event.get::<(u32, u32)>(), Some(&(800, 600)));
    }

    #[test]
    fn post_with_builds_one_value_per_listener() {
        struct NotClone(u32);

        let source = Broadcaster::<()>::new();
        let a = source.subscribe();
        let b = source.subscribe();
        let mut built = 0;
        let delivered = source.post_with(
            || (),
            || {
                built += 1;
                NotClone(built)
            },
        );
        assert_eq!(delivered, 2);
        assert_eq!(a.receive().and_then(|e| e.get::<NotClone>().map(|v| v.0)), Some(1));
        assert_eq!(b.receive().and_then(|e| e.get::<NotClone>().map(|v| v.0)), Some(2));
    }

    #[test]
    fn post_from_threads_keeps_per_producer_order() {
        let source = Arc::new(Broadcaster::<()>::new());
        let listener = source.subscribe();

        let handles: Vec<_> = (0..4u32)
            .map(|producer| {
                let source = Arc::clone(&source);
                thread::spawn(move || {
                    for seq in 0..250u32 {
                        source.post((), (producer, seq));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread join failed");
        }

        let mut last_seen = [None::<u32>; 4];
        let mut total = 0;
        for event in listener.drain() {
            let (producer, seq) = *event.get::<(u32, u32)>().unwrap();
            if let Some(previous) = last_seen[producer as usize] {
                assert!(seq > previous, "producer {producer} delivered out of order");
            }
            last_seen[producer as usize] = Some(seq);
            total += 1;
        }
        assert_eq!(total, 1000);
    }

    #[test]
    fn post_from_thread_reaches_listener() {
        let source = Arc::new(Broadcaster::<()>::new());
        let listener = source.subscribe();
        let remote = Arc::clone(&source);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.post((), dummy_key_event());
        });
        handle.join().expect("Thread join failed");

        let event = listener.receive().expect("event should have been delivered");
        assert_eq!(event.get::<TestEvent>(), Some(&dummy_key_event()));
    }
}
