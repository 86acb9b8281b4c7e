//! Service health board and the sequential `/healthz` sweep.

use crate::actions::Action;
use crate::error::Result;
use crate::executor::Executor;
use crate::store::lock_store;
use crate::types::ServiceKey;
use std::collections::BTreeMap;
use strum::Display;
use tracing::{info, warn};

/// Last known status of one service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Ready,
    Down,
}

/// Aggregate of every service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallHealth {
    AllReady,
    HasDown,
    Partial,
}

/// One status per service, initially all unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthBoard {
    statuses: BTreeMap<ServiceKey, ServiceHealth>,
}

impl Default for HealthBoard {
    fn default() -> Self {
        Self {
            statuses: ServiceKey::all()
                .into_iter()
                .map(|service| (service, ServiceHealth::Unknown))
                .collect(),
        }
    }
}

impl HealthBoard {
    pub fn set(&mut self, service: ServiceKey, health: ServiceHealth) {
        self.statuses.insert(service, health);
    }

    pub fn get(&self, service: ServiceKey) -> ServiceHealth {
        self.statuses.get(&service).copied().unwrap_or_default()
    }

    /// Statuses in sweep order
    pub fn iter(&self) -> impl Iterator<Item = (ServiceKey, ServiceHealth)> + '_ {
        self.statuses.iter().map(|(service, health)| (*service, *health))
    }

    pub fn overall(&self) -> OverallHealth {
        if self.statuses.values().all(|h| *h == ServiceHealth::Ready) {
            OverallHealth::AllReady
        } else if self.statuses.values().any(|h| *h == ServiceHealth::Down) {
            OverallHealth::HasDown
        } else {
            OverallHealth::Partial
        }
    }
}

/// Probe one service: ready iff `/healthz` succeeds, down on any error
pub fn check(executor: &Executor, service: ServiceKey) -> Result<ServiceHealth> {
    let drafts = lock_store(executor.store())?.drafts().clone();
    let health = match executor.execute(Action::Healthz(service).build(&drafts)) {
        Ok(_) => ServiceHealth::Ready,
        Err(e) => {
            warn!("{} health check failed: {}", service.label(), e);
            ServiceHealth::Down
        }
    };
    lock_store(executor.store())?.set_health(service, health);
    Ok(health)
}

/// Check every service in turn; one failure never stops the rest
pub fn sweep(executor: &Executor) -> Result<HealthBoard> {
    let mut board = HealthBoard::default();
    for service in ServiceKey::all() {
        board.set(service, check(executor, service)?);
    }
    info!("Health sweep finished: {}", board.overall());
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(statuses: &[ServiceHealth]) -> HealthBoard {
        let mut board = HealthBoard::default();
        for (service, health) in ServiceKey::all().into_iter().zip(statuses) {
            board.set(service, *health);
        }
        board
    }

    #[test]
    fn test_default_board_is_partial() {
        let board = HealthBoard::default();
        assert_eq!(board.iter().count(), 6);
        assert!(board.iter().all(|(_, h)| h == ServiceHealth::Unknown));
        assert_eq!(board.overall(), OverallHealth::Partial);
    }

    #[test]
    fn test_overall_all_ready() {
        let board = board(&[ServiceHealth::Ready; 6]);
        assert_eq!(board.overall(), OverallHealth::AllReady);
        assert_eq!(board.overall().to_string(), "ALL_READY");
    }

    #[test]
    fn test_any_down_wins_over_unknown() {
        let mut statuses = [ServiceHealth::Ready; 6];
        statuses[2] = ServiceHealth::Unknown;
        statuses[4] = ServiceHealth::Down;
        let board = board(&statuses);
        assert_eq!(board.overall(), OverallHealth::HasDown);
        assert_eq!(board.overall().to_string(), "HAS_DOWN");
    }

    #[test]
    fn test_partial_when_some_unknown() {
        let mut statuses = [ServiceHealth::Ready; 6];
        statuses[0] = ServiceHealth::Unknown;
        assert_eq!(board(&statuses).overall().to_string(), "PARTIAL");
        assert_eq!(ServiceHealth::Ready.to_string(), "ready");
    }
}
