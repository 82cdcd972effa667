use std::fmt::Debug;

use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that can be read synchronously or watched for changes.
///
/// Setting an equal value does not wake watchers.
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Property holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self { tx, rx }
    }

    /// Replace the value, notifying watchers if it changed.
    pub(crate) fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        let _ = self.tx.send_if_modified(|current| {
            if *current != new_value {
                *current = new_value;
                true
            } else {
                false
            }
        });
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait until the value satisfies `predicate` and return it.
    pub async fn wait_for(&self, mut predicate: impl FnMut(&T) -> bool) -> T {
        let mut rx = self.rx.clone();
        match rx.wait_for(|value| predicate(value)).await {
            Ok(value) => value.clone(),
            // Unreachable while `self` holds the sender
            Err(_) => self.get(),
        }
    }

    /// Stream of values, starting with the current one.
    pub fn watch(&self) -> impl Stream<Item = T> + Send {
        WatchStream::new(self.rx.clone())
    }
}

impl<T: Clone + Send + Sync + Debug + 'static> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn watchers_see_only_changes() {
        let property = Property::new(1);
        let mut values = Box::pin(property.watch());

        assert_eq!(values.next().await, Some(1));

        property.set(1);
        property.set(2);
        assert_eq!(values.next().await, Some(2));
        assert_eq!(property.get(), 2);
    }

    #[tokio::test]
    async fn wait_for_returns_matching_value() {
        let property = Property::new(0);
        let writer = property.clone();

        let task = tokio::spawn(async move {
            for value in 1..=5 {
                writer.set(value);
                tokio::task::yield_now().await;
            }
        });

        assert!(property.wait_for(|value| *value >= 3).await >= 3);
        task.await.unwrap();
    }
}
