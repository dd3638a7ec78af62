//! `WebsocketClientRider::io()` connection reuse, reached through the
//! public `launart` facade. `rider.rs`'s own unit tests cover the
//! autoreceive reconnect loop (`use_transport`/`connection_manage`)
//! thoroughly; this covers the other call path through the same rider -
//! manual `io()` polling - which never goes through that loop at all.

use async_trait::async_trait;
use launart::{ConnectFactory, Packet, TransportError, WebsocketClientRider, WebsocketIO};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct StubIO {
    closed: AtomicBool,
}

#[async_trait]
impl WebsocketIO for StubIO {
    async fn receive(&self) -> Result<Packet, TransportError> {
        Err(TransportError::ConnectionClosed)
    }
    async fn send(&self, _packet: Packet) -> Result<(), TransportError> {
        Ok(())
    }
    async fn accept(&self) -> Result<(), TransportError> {
        Ok(())
    }
    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
    fn request(&self) -> &launart::HttpRequestInfo {
        unimplemented!()
    }
}

#[tokio::test]
async fn io_reuses_the_same_connection_until_it_closes() {
    let opens = Arc::new(AtomicUsize::new(0));
    let opens_for_factory = opens.clone();
    let factory: ConnectFactory = Arc::new(move || {
        let opens = opens_for_factory.clone();
        Box::pin(async move {
            opens.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubIO { closed: AtomicBool::new(false) }) as Arc<dyn WebsocketIO>)
        })
    });

    let rider = WebsocketClientRider::new(factory);

    let first = rider.io().await.unwrap();
    let second = rider.io().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    first.close().await.unwrap();

    let third = rider.io().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn a_failed_open_surfaces_the_factory_error_and_updates_status() {
    let factory: ConnectFactory =
        Arc::new(|| Box::pin(async { Err(TransportError::ConnectionFailed("refused".into())) }));
    let rider = WebsocketClientRider::new(factory);

    let err = rider.io().await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionFailed(_)));
    assert!(!rider.status().available());
}
