// UDP ingest module.
// Invariants: one datagram is one full snapshot; anything that does not decode to horses is dropped
// and the store keeps what it had. Payloads are never logged.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::constants::{INSPECT_LOG_INTERVAL_MS, RECV_ERROR_BACKOFF_MS, UDP_RECV_BUFFER};
use crate::store::{PublishInfo, StandingsStore};
use crate::utils::monotonic_ms;
use race_core::parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Published { horses: usize },
    NotStandings,
    NoRecords,
    FilteredSource,
}

pub async fn bind_udp_socket(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).await?;
    info!(addr = %socket.local_addr()?, "udp ingest started");
    Ok(socket)
}

pub async fn udp_loop(
    socket: UdpSocket,
    store: Arc<StandingsStore>,
    source_filter: Option<IpAddr>,
    start: Instant,
) {
    let mut buf = [0u8; UDP_RECV_BUFFER];
    let mut last_inspect_log_ms: Option<u64> = None;

    // Runs for the process lifetime; receive errors are logged and the loop carries on.
    loop {
        let (len, source) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(err) => {
                warn!(?err, "udp receive failed");
                time::sleep(Duration::from_millis(RECV_ERROR_BACKOFF_MS)).await;
                continue;
            }
        };
        let now_ms = monotonic_ms(start);
        let outcome = ingest_datagram(&buf[..len], source, source_filter, &store, now_ms).await;

        match outcome {
            IngestOutcome::Published { horses } => {
                let due = last_inspect_log_ms
                    .map(|last| now_ms.saturating_sub(last) >= INSPECT_LOG_INTERVAL_MS)
                    .unwrap_or(true);
                if due {
                    last_inspect_log_ms = Some(now_ms);
                    let leader_id = store.read().await.first().map(|horse| horse.horse_id);
                    info!(
                        packet_len = len,
                        source = %source,
                        horses,
                        leader_id = ?leader_id,
                        "standings inspect"
                    );
                }
            }
            IngestOutcome::NotStandings => {
                debug!(packet_len = len, source = %source, "datagram is not a standings packet");
            }
            IngestOutcome::NoRecords => {
                debug!(packet_len = len, source = %source, "standings packet without valid records");
            }
            IngestOutcome::FilteredSource => {
                debug!(source = %source, "datagram from unexpected source ignored");
            }
        }
    }
}

pub async fn ingest_datagram(
    payload: &[u8],
    source: SocketAddr,
    source_filter: Option<IpAddr>,
    store: &StandingsStore,
    now_ms: u64,
) -> IngestOutcome {
    if let Some(expected) = source_filter {
        if source.ip() != expected {
            return IngestOutcome::FilteredSource;
        }
    }

    let standings = match parser::decode(payload) {
        Some(standings) => standings,
        None => return IngestOutcome::NotStandings,
    };
    if standings.is_empty() {
        return IngestOutcome::NoRecords;
    }

    let horses = standings.len();
    store
        .publish(
            standings,
            PublishInfo {
                now_ms,
                source_ip: Some(source.ip()),
                packet_len: Some(payload.len()),
            },
        )
        .await;
    IngestOutcome::Published { horses }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn sender() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 4141)
    }

    #[tokio::test]
    async fn valid_packet_is_published() {
        let store = StandingsStore::new();
        let outcome = ingest_datagram(
            b"CLASSIFICA(1,last one,1200.0,10.0,60.5,0)(2,15.0,1215.0,8.0,58.0,0)",
            sender(),
            None,
            &store,
            42,
        )
        .await;
        assert_eq!(outcome, IngestOutcome::Published { horses: 2 });
        assert_eq!(store.read().await.len(), 2);
        assert_eq!(store.stats().await.last_publish_ms, Some(42));
    }

    #[tokio::test]
    async fn rejected_packets_leave_store_untouched() {
        let store = StandingsStore::new();
        ingest_datagram(b"CLASSIFICA(3,last one,500,4,50,0)", sender(), None, &store, 1).await;
        let before = store.read().await;

        let payloads: [&[u8]; 4] = [
            b"",
            b"HELLO(1,2,3,4,5,6)",
            b"CLASSIFICA",
            b"CLASSIFICA(1,x,bad,4,5,6)",
        ];
        for payload in payloads {
            for _ in 0..3 {
                let outcome = ingest_datagram(payload, sender(), None, &store, 2).await;
                assert!(matches!(
                    outcome,
                    IngestOutcome::NotStandings | IngestOutcome::NoRecords
                ));
            }
        }

        assert!(Arc::ptr_eq(&before, &store.read().await));
        assert_eq!(store.stats().await.publish_count, 1);
    }

    #[tokio::test]
    async fn source_filter_drops_other_senders() {
        let store = StandingsStore::new();
        let outcome = ingest_datagram(
            b"CLASSIFICA(3,last one,500,4,50,0)",
            sender(),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9))),
            &store,
            1,
        )
        .await;
        assert_eq!(outcome, IngestOutcome::FilteredSource);
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn loop_publishes_datagrams_from_the_wire() {
        let socket = bind_udp_socket(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind receiver");
        let target = socket.local_addr().expect("receiver addr");
        let store = Arc::new(StandingsStore::new());
        let task = tokio::spawn(udp_loop(socket, store.clone(), None, Instant::now()));

        let client = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind sender");
        client
            .send_to(b"not standings", target)
            .await
            .expect("send junk");
        client
            .send_to(b"CLASSIFICA,(8,2.5,640,12,57.5,31)(5,last one,642.5,9,56,31)", target)
            .await
            .expect("send standings");

        let mut published = false;
        for _ in 0..100 {
            if store.read().await.len() == 2 {
                published = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        task.abort();

        assert!(published, "standings never reached the store");
        let standings = store.read().await;
        assert_eq!(standings[0].horse_id, 8);
        assert_eq!(standings[1].horse_id, 5);
    }

    #[tokio::test]
    async fn receive_errors_do_not_stop_the_loop() {
        let vacant = {
            let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
                .await
                .expect("bind vacant");
            socket.local_addr().expect("vacant addr")
        };

        // Sending to a closed port queues a connection-refused error for the next receive.
        let socket = bind_udp_socket(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind receiver");
        socket.connect(vacant).await.expect("connect receiver");
        socket.send(b"ping").await.expect("send to vacant port");

        let store = Arc::new(StandingsStore::new());
        let task = tokio::spawn(udp_loop(socket, store.clone(), None, Instant::now()));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!task.is_finished(), "receive loop stopped after an error");
        task.abort();
        assert!(store.read().await.is_empty());
    }
}
