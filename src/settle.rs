//! Settle-once signals and a join over them.
//!
//! An image in the preview either loads or fails, and either way it has
//! settled. Export waits for all of them before rasterizing. Nothing here
//! knows about images; the key type identifies whatever is being waited on.

use std::future::Future;
use tokio::sync::oneshot;

/// Outcome of a settle-once signal. Both variants count as settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settle<T> {
    Loaded(T),
    Errored(String),
}

impl<T> Settle<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Settle::Loaded(_))
    }
}

/// Producer side. Consuming `load`/`error` makes double settlement impossible.
#[derive(Debug)]
pub struct SettleHandle<T> {
    tx: oneshot::Sender<Settle<T>>,
}

impl<T> SettleHandle<T> {
    pub fn load(self, value: T) {
        let _ = self.tx.send(Settle::Loaded(value));
    }

    pub fn error(self, reason: impl Into<String>) {
        let _ = self.tx.send(Settle::Errored(reason.into()));
    }
}

/// Consumer side of a settle-once signal.
#[derive(Debug)]
pub struct SettleSignal<T> {
    rx: oneshot::Receiver<Settle<T>>,
}

impl<T> SettleSignal<T> {
    pub fn channel() -> (SettleHandle<T>, SettleSignal<T>) {
        let (tx, rx) = oneshot::channel();
        (SettleHandle { tx }, SettleSignal { rx })
    }

    /// A signal that has already settled, for resources that are complete
    /// before anyone waits on them.
    pub fn ready(outcome: Settle<T>) -> Self {
        let (handle, signal) = Self::channel();
        let _ = handle.tx.send(outcome);
        signal
    }

    /// Wait for the outcome. A handle dropped without settling counts as an
    /// error so it cannot stall a join.
    pub async fn settled(self) -> Settle<T> {
        self.rx
            .await
            .unwrap_or_else(|_| Settle::Errored("signal abandoned before settling".into()))
    }
}

/// Wait until every signal has settled and return the outcomes with their
/// keys, in input order. There is no timeout: a signal whose handle is held
/// forever without settling blocks the join.
pub async fn await_all<K, F, T>(signals: impl IntoIterator<Item = (K, F)>) -> Vec<(K, Settle<T>)>
where
    F: Future<Output = Settle<T>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = signals.into_iter().unzip();
    let outcomes = futures::future::join_all(futures).await;
    keys.into_iter().zip(outcomes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn waits_for_every_signal_in_order() {
        let (h1, s1) = SettleSignal::<u32>::channel();
        let (h2, s2) = SettleSignal::<u32>::channel();
        let s3 = SettleSignal::ready(Settle::Loaded(3));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            h2.error("404");
            tokio::time::sleep(Duration::from_millis(20)).await;
            h1.load(1);
        });

        let out = await_all(vec![
            ("a", s1.settled()),
            ("b", s2.settled()),
            ("c", s3.settled()),
        ])
        .await;

        assert_eq!(
            out,
            vec![
                ("a", Settle::Loaded(1)),
                ("b", Settle::Errored("404".into())),
                ("c", Settle::Loaded(3)),
            ]
        );
    }

    #[tokio::test]
    async fn dropped_handle_settles_as_error() {
        let (h, s) = SettleSignal::<()>::channel();
        drop(h);
        let out = await_all([(0usize, s.settled())]).await;
        assert!(!out[0].1.is_loaded());
    }

    #[tokio::test]
    async fn empty_join_completes() {
        let out: Vec<(usize, Settle<()>)> =
            await_all(Vec::<(usize, std::future::Ready<Settle<()>>)>::new()).await;
        assert!(out.is_empty());
    }
}
