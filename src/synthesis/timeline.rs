//! Cut points of the merged timeline.

use chrono::Duration;

/// A run of raw breakpoints treated as a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cluster {
    first: Duration,
    last: Duration,
    at: Duration,
}

/// The sorted cut points of one cycle, from 0 to the cycle end
///
/// Breakpoints less than `tolerance` after the first point of a cluster
/// join that cluster. A cluster touching 0 or the cycle end is pinned
/// there so the phases still cover the cycle exactly; any other cluster
/// sits at its earliest breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    clusters: Vec<Cluster>,
}

impl Timeline {
    #[must_use]
    pub fn new(
        breakpoints: impl IntoIterator<Item = Duration>,
        cycle_length: Duration,
        tolerance: Duration,
    ) -> Self {
        let mut points: Vec<Duration> = breakpoints
            .into_iter()
            .filter(|&p| p > Duration::zero() && p < cycle_length)
            .collect();
        points.push(Duration::zero());
        points.push(cycle_length);
        points.sort();
        points.dedup();

        let mut clusters: Vec<Cluster> = Vec::new();
        for point in points {
            match clusters.last_mut() {
                Some(cluster) if point - cluster.first < tolerance && point != cycle_length => {
                    cluster.last = point;
                }
                Some(cluster) if point - cluster.first < tolerance => {
                    // The cycle end absorbs the cluster, unless that would swallow 0
                    if cluster.first == Duration::zero() {
                        clusters.push(Cluster { first: point, last: point, at: point });
                    } else {
                        cluster.last = point;
                        cluster.at = point;
                    }
                }
                _ => clusters.push(Cluster { first: point, last: point, at: point }),
            }
        }

        Self { clusters }
    }

    /// Cut points in ascending order, starting at 0 and ending at the cycle length
    #[must_use]
    pub fn cuts(&self) -> Vec<Duration> {
        self.clusters.iter().map(|c| c.at).collect()
    }

    /// Move a raw breakpoint onto the cut point of its cluster
    #[must_use]
    pub fn snap(&self, point: Duration) -> Duration {
        self.clusters
            .iter()
            .find(|c| c.first <= point && point <= c.last)
            .map_or(point, |c| c.at)
    }
}
