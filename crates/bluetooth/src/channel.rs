use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Error)))]
pub enum Error {
  #[snafu(display("channel closed by peer"))]
  Closed,
  #[snafu(display("channel queue full"))]
  Full,
}

/// One end of a connected pair of datagram channels, standing in for an
/// L2CAP channel: frame boundaries are preserved, sends enqueue without
/// waiting, and the queue capacity bounds buffering.
#[derive(Debug)]
pub struct Channel {
  tx: Sender,
  rx: Receiver,
}

#[derive(Clone, Debug)]
pub struct Sender(mpsc::Sender<Bytes>);

#[derive(Debug)]
pub struct Receiver(mpsc::Receiver<Bytes>);

impl Channel {
  pub fn pair(capacity: usize) -> (Self, Self) {
    let (a_tx, a_rx) = mpsc::channel(capacity);
    let (b_tx, b_rx) = mpsc::channel(capacity);

    (
      Self {
        tx: Sender(a_tx),
        rx: Receiver(b_rx),
      },
      Self {
        tx: Sender(b_tx),
        rx: Receiver(a_rx),
      },
    )
  }

  pub fn split(self) -> (Sender, Receiver) {
    (self.tx, self.rx)
  }

  pub fn sender(&self) -> Sender {
    self.tx.clone()
  }

  pub fn send(&self, pdu: impl Into<Bytes>) -> Result<(), Error> {
    self.tx.send(pdu)
  }

  pub async fn recv(&mut self) -> Option<Bytes> {
    self.rx.recv().await
  }
}

impl Sender {
  pub fn send(&self, pdu: impl Into<Bytes>) -> Result<(), Error> {
    self.0.try_send(pdu.into()).map_err(|err| match err {
      mpsc::error::TrySendError::Closed(_) => Error::Closed,
      mpsc::error::TrySendError::Full(_) => Error::Full,
    })
  }
}

impl Receiver {
  pub async fn recv(&mut self) -> Option<Bytes> {
    self.0.recv().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn round_trip() {
    let (alice, mut bob) = Channel::pair(4);

    alice.send(vec![1, 2, 3]).unwrap();
    alice.send(Bytes::from_static(b"")).unwrap();

    assert_eq!(bob.recv().await.unwrap(), Bytes::from_static(&[1, 2, 3]));
    assert_eq!(bob.recv().await.unwrap(), Bytes::new());
  }

  #[tokio::test]
  async fn closed() {
    let (alice, bob) = Channel::pair(1);

    drop(bob);

    assert!(matches!(alice.send(vec![1]), Err(Error::Closed)));

    let (alice, mut bob) = Channel::pair(1);

    drop(alice);

    assert_eq!(bob.recv().await, None);
  }

  #[tokio::test]
  async fn full() {
    let (alice, _bob) = Channel::pair(1);

    alice.send(vec![1]).unwrap();

    assert!(matches!(alice.send(vec![2]), Err(Error::Full)));
  }
}
