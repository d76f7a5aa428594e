// Latest-standings handoff between the UDP receiver and the frame producer.
// Invariants: publish swaps a whole Arc under the lock; readers never see a partial snapshot.

use std::net::IpAddr;
use std::sync::Arc;

use race_core::Standings;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestStats {
    pub publish_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_publish_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_source_ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_packet_len: Option<usize>,
}

pub struct PublishInfo {
    pub now_ms: u64,
    pub source_ip: Option<IpAddr>,
    pub packet_len: Option<usize>,
}

struct Slot {
    current: Arc<Standings>,
    stats: IngestStats,
}

pub struct StandingsStore {
    slot: RwLock<Slot>,
}

impl Default for StandingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StandingsStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot {
                current: Arc::new(Vec::new()),
                stats: IngestStats::default(),
            }),
        }
    }

    pub async fn publish(&self, snapshot: Standings, info: PublishInfo) {
        let snapshot = Arc::new(snapshot);
        let mut slot = self.slot.write().await;
        slot.current = snapshot;
        slot.stats.publish_count = slot.stats.publish_count.saturating_add(1);
        slot.stats.last_publish_ms = Some(info.now_ms);
        if info.source_ip.is_some() {
            slot.stats.last_source_ip = info.source_ip;
        }
        if info.packet_len.is_some() {
            slot.stats.last_packet_len = info.packet_len;
        }
    }

    pub async fn read(&self) -> Arc<Standings> {
        self.slot.read().await.current.clone()
    }

    pub async fn stats(&self) -> IngestStats {
        self.slot.read().await.stats.clone()
    }

    pub async fn read_with_stats(&self) -> (Arc<Standings>, IngestStats) {
        let slot = self.slot.read().await;
        (slot.current.clone(), slot.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use race_core::decode;

    use super::*;

    fn info(now_ms: u64) -> PublishInfo {
        PublishInfo {
            now_ms,
            source_ip: Some(IpAddr::from([192, 168, 1, 20])),
            packet_len: Some(64),
        }
    }

    #[tokio::test]
    async fn empty_before_first_publish() {
        let store = StandingsStore::new();
        assert!(store.read().await.is_empty());
        assert_eq!(store.stats().await, IngestStats::default());
    }

    #[tokio::test]
    async fn publish_replaces_whole_snapshot() {
        let store = StandingsStore::new();
        let first = decode(b"CLASSIFICA(1,2.0,100,5,40,0)(2,3.0,102,5,40,0)(3,last one,105,5,40,0)")
            .expect("standings packet");
        let second = decode(b"CLASSIFICA(7,last one,90,5,40,0)").expect("standings packet");

        store.publish(first, info(10)).await;
        let held = store.read().await;
        assert_eq!(held.len(), 3);

        store.publish(second.clone(), info(20)).await;
        assert_eq!(*store.read().await, second);
        assert_eq!(held.len(), 3, "earlier readers keep their copy");

        let stats = store.stats().await;
        assert_eq!(stats.publish_count, 2);
        assert_eq!(stats.last_publish_ms, Some(20));
        assert_eq!(stats.last_packet_len, Some(64));
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_torn_snapshots() {
        let store = Arc::new(StandingsStore::new());
        let writer_store = store.clone();
        let writer = tokio::spawn(async move {
            for round in 0..200u64 {
                let size = (round % 5 + 1) as i32;
                let snapshot: race_core::Standings = (0..size)
                    .map(|index| race_core::HorseTelemetry {
                        horse_id: index,
                        gap: race_core::Gap::Meters(round as f64),
                        gap_text: round.to_string(),
                        meters_to_finish: 1000.0,
                        lateral_position: 5.0,
                        speed_kph: None,
                    })
                    .collect();
                writer_store.publish(snapshot, info(round)).await;
                tokio::task::yield_now().await;
            }
        });

        for _ in 0..200 {
            let snapshot = store.read().await;
            if let Some(first) = snapshot.first() {
                assert!(snapshot.iter().all(|horse| horse.gap == first.gap));
            }
            tokio::task::yield_now().await;
        }
        writer.await.expect("writer task");
    }
}
