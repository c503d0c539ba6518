//! One-time snapshot reads that seed the map.

use std::future::Future;

use herdmap_types::{Animal, KeyPoint, Zone};

/// Everything the map draws before live updates start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Animals, in the order the source listed them.
    pub animals: Vec<Animal>,
    /// Zones.
    pub zones: Vec<Zone>,
    /// Key points.
    pub key_points: Vec<KeyPoint>,
}

/// Read-only source of snapshot entities for the signed-in farm.
///
/// The farm is implied by the source itself (for [`ApiClient`], by its
/// bearer token), so the calls take no farm argument.
///
/// [`ApiClient`]: crate::ApiClient
pub trait SnapshotSource: Send + Sync {
    /// Error returned by every read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List the farm's animals.
    fn list_animals(&self) -> impl Future<Output = Result<Vec<Animal>, Self::Error>> + Send;

    /// List the farm's zones.
    fn list_zones(&self) -> impl Future<Output = Result<Vec<Zone>, Self::Error>> + Send;

    /// List the farm's key points.
    fn list_key_points(&self) -> impl Future<Output = Result<Vec<KeyPoint>, Self::Error>> + Send;

    /// Run the three reads concurrently. The first failure wins.
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send {
        async {
            let (animals, zones, key_points) =
                tokio::try_join!(self.list_animals(), self.list_zones(), self.list_key_points())?;
            Ok(Snapshot {
                animals,
                zones,
                key_points,
            })
        }
    }
}
