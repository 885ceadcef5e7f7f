//! Analytics service
//!
//! Counts visits, interactions and section views. A `page_view` event is
//! a visit attributed to the visitor's device; every other event is an
//! interaction.

use crate::database::Repository;
use crate::device::DeviceTier;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Event name that counts as a visit
pub const PAGE_VIEW_EVENT: &str = "page_view";

/// A validated analytics event
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub event: String,
    pub device: DeviceTier,
    pub section: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Share of visits per device tier, in whole percent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceBreakdown {
    pub mobile: u64,
    pub tablet: u64,
    pub desktop: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_visits: u64,
    pub device_breakdown: DeviceBreakdown,
    pub interactions: u64,
    pub section_views: BTreeMap<String, u64>,
}

/// Raw counters a summary is derived from
#[derive(Debug, Clone, Default)]
pub struct AnalyticsTally {
    visits_by_device: BTreeMap<DeviceTier, u64>,
    interactions: u64,
    sections: BTreeMap<String, u64>,
}

impl AnalyticsTally {
    fn record(&mut self, event: &AnalyticsEvent) {
        if event.event == PAGE_VIEW_EVENT {
            *self.visits_by_device.entry(event.device).or_default() += 1;
        } else {
            self.interactions += 1;
        }

        if let Some(section) = &event.section {
            *self.sections.entry(section.clone()).or_default() += 1;
        }
    }

    pub fn summary(&self) -> AnalyticsSummary {
        let total_visits: u64 = self.visits_by_device.values().sum();
        let share = |tier: DeviceTier| {
            let count = self.visits_by_device.get(&tier).copied().unwrap_or(0);
            percent(count, total_visits)
        };

        AnalyticsSummary {
            total_visits,
            device_breakdown: DeviceBreakdown {
                mobile: share(DeviceTier::Mobile),
                tablet: share(DeviceTier::Tablet),
                desktop: share(DeviceTier::Desktop),
            },
            interactions: self.interactions,
            section_views: self.sections.clone(),
        }
    }
}

/// Rounded whole percentage; zero when there is nothing to divide
fn percent(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count * 100 + total / 2) / total
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()>;
    async fn summary(&self) -> Result<AnalyticsSummary>;
}

/// Process-local counters, reset on restart
#[derive(Default)]
pub struct InMemoryAnalytics {
    tally: Mutex<AnalyticsTally>,
}

impl InMemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalytics {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()> {
        self.tally.lock().await.record(event);
        tracing::debug!("Analytics event recorded: {} ({})", event.event, event.device.as_str());
        Ok(())
    }

    async fn summary(&self) -> Result<AnalyticsSummary> {
        Ok(self.tally.lock().await.summary())
    }
}

/// Events appended to the local database
pub struct SqliteAnalytics {
    repo: Repository,
}

impl SqliteAnalytics {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AnalyticsStore for SqliteAnalytics {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()> {
        self.repo
            .record_analytics_event(
                &event.event,
                event.device.as_str(),
                event.section.as_deref(),
                event.occurred_at,
            )
            .await
    }

    async fn summary(&self) -> Result<AnalyticsSummary> {
        let mut tally = AnalyticsTally::default();

        for (device, count) in self.repo.count_events_by_device(PAGE_VIEW_EVENT).await? {
            match device.parse::<DeviceTier>() {
                Ok(tier) => {
                    *tally.visits_by_device.entry(tier).or_default() += count.max(0) as u64;
                }
                Err(_) => tracing::warn!("Skipping visits from unknown device {:?}", device),
            }
        }

        tally.interactions = self.repo.count_events_except(PAGE_VIEW_EVENT).await?.max(0) as u64;

        for (section, count) in self.repo.count_events_by_section().await? {
            tally.sections.insert(section, count.max(0) as u64);
        }

        Ok(tally.summary())
    }
}
