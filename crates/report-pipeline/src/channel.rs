//! 핸드오프 채널 -- 버퍼 0을 동기 전달로 지원하는 mpsc 래퍼
//!
//! `tokio::sync::mpsc`는 용량 0 채널을 만들 수 없으므로, 버퍼 크기가 0이면
//! 용량 1 채널 위에 수신 확인(ack)을 얹어 송신자가 수신자가 항목을 가져갈 때까지
//! 대기하도록 합니다.
//!
//! | buffer | `send` 완료 시점 |
//! |--------|------------------|
//! | 0      | 수신자가 `recv`로 항목을 가져간 뒤 |
//! | N > 0  | 큐에 빈 자리가 생겨 항목이 적재된 뒤 |
//!
//! 수신측에서 [`HandoffReceiver::close`]를 호출하면 이후 송신은 [`HandoffError::Closed`]로
//! 실패하고, 이미 적재된 항목은 계속 수신할 수 있습니다.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

pub use tokio::sync::mpsc::error::TryRecvError;

/// 채널 내부 봉투 -- 동기 전달 모드에서만 ack를 가짐
struct Envelope<T> {
    item: T,
    delivered: Option<oneshot::Sender<()>>,
}

impl<T> Envelope<T> {
    /// 항목을 꺼내고 대기 중인 송신자에게 수신을 알립니다.
    fn accept(self) -> T {
        let Envelope { item, delivered } = self;
        if let Some(ack) = delivered {
            // 송신자가 이미 포기했을 수 있음
            let _ = ack.send(());
        }
        item
    }
}

/// 핸드오프 송신 에러
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandoffError {
    /// 수신측이 닫혀 항목을 받지 않음
    #[error("receiver closed")]
    Closed,
    /// 항목은 적재됐지만 수신자가 가져가기 전에 사라짐
    #[error("receiver dropped before taking the item")]
    Undelivered,
}

/// 버퍼 크기에 따라 핸드오프 채널을 생성합니다.
///
/// `buffer == 0`이면 동기 전달(rendezvous), 그 외에는 용량 `buffer`의 bounded 큐입니다.
pub fn channel<T>(buffer: usize) -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (
        HandoffSender {
            tx,
            rendezvous: buffer == 0,
        },
        HandoffReceiver { rx },
    )
}

/// 핸드오프 채널 송신측 (복제 가능)
pub struct HandoffSender<T> {
    tx: mpsc::Sender<Envelope<T>>,
    rendezvous: bool,
}

impl<T> HandoffSender<T> {
    /// 항목을 전송합니다.
    ///
    /// 동기 전달 모드에서는 수신자가 항목을 가져갈 때까지 반환하지 않습니다.
    pub async fn send(&self, item: T) -> Result<(), HandoffError> {
        if !self.rendezvous {
            return self
                .tx
                .send(Envelope {
                    item,
                    delivered: None,
                })
                .await
                .map_err(|_| HandoffError::Closed);
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                item,
                delivered: Some(ack_tx),
            })
            .await
            .map_err(|_| HandoffError::Closed)?;

        ack_rx.await.map_err(|_| HandoffError::Undelivered)
    }

    /// 수신측이 닫혔는지 확인합니다.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// 동기 전달 모드인지 확인합니다.
    pub fn is_rendezvous(&self) -> bool {
        self.rendezvous
    }
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rendezvous: self.rendezvous,
        }
    }
}

impl<T> fmt::Debug for HandoffSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffSender")
            .field("rendezvous", &self.rendezvous)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// 핸드오프 채널 수신측
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<Envelope<T>>,
}

impl<T> HandoffReceiver<T> {
    /// 다음 항목을 수신합니다. 모든 송신측이 사라지거나 닫힌 뒤 비면 `None`.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await.map(Envelope::accept)
    }

    /// 대기 없이 수신을 시도합니다.
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        self.rx.try_recv().map(Envelope::accept)
    }

    /// 수신측을 닫습니다. 적재된 항목은 계속 수신할 수 있습니다.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl<T> fmt::Debug for HandoffReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffReceiver").finish_non_exhaustive()
    }
}
