//! Disk request scheduling policies.
//!
//! Every policy implements the [`DiskScheduler`] trait; the kernel holds a
//! boxed trait object and never knows which ordering rule is driving the
//! spindle. [`create_scheduler`] is the factory the kernel and the CLI go
//! through.

mod fifo;
mod flook;
mod look;

pub use fifo::FifoScheduler;
pub use flook::FlookScheduler;
pub use look::LookScheduler;

use std::str::FromStr;

use crate::config::SimConfig;
use crate::disk::DiskRequest;
use crate::error::ConfigError;

/// Trait every disk scheduling policy implements.
pub trait DiskScheduler {
    /// Policy name as printed in traces and reports.
    fn name(&self) -> &'static str;

    /// Accept a new request.
    fn enqueue(&mut self, request: DiskRequest);

    /// Select and remove the next request to service, given the current head
    /// track. Returns `None` when nothing is pending.
    fn pop_next(&mut self, current_track: u32) -> Option<DiskRequest>;

    /// Whether any request is waiting.
    fn has_pending(&self) -> bool;

    /// Queue contents for the trace.
    fn snapshot(&self) -> QueueSnapshot;
}

/// Selectable scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fifo,
    Look,
    Flook,
}

impl PolicyKind {
    /// All policies, in the order `compare` runs them.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fifo, PolicyKind::Look, PolicyKind::Flook];
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fifo => write!(f, "FIFO"),
            Self::Look => write!(f, "LOOK"),
            Self::Flook => write!(f, "FLOOK"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "look" => Ok(Self::Look),
            "flook" => Ok(Self::Flook),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Build the scheduler for `kind` with the policy knobs from `config`.
pub fn create_scheduler(kind: PolicyKind, config: &SimConfig) -> Box<dyn DiskScheduler> {
    match kind {
        PolicyKind::Fifo => Box::new(FifoScheduler::new()),
        PolicyKind::Look => Box::new(LookScheduler::new(config.look_max_same_track)),
        PolicyKind::Flook => Box::new(FlookScheduler::new(config.flook_process_forward)),
    }
}

/// Condensed view of one queued request, for trace output.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBrief {
    pub id: u64,
    pub sector: u64,
    pub track: u32,
    pub write: bool,
    pub pid: Option<u32>,
}

impl From<&DiskRequest> for RequestBrief {
    fn from(request: &DiskRequest) -> Self {
        Self {
            id: request.id,
            sector: request.sector,
            track: request.track,
            write: request.write,
            pid: request.pid,
        }
    }
}

/// Queue contents at one instant. FIFO and LOOK report a single queue in
/// `active`; FLOOK additionally reports the frozen `incoming` batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    pub active: Vec<RequestBrief>,
    pub incoming: Vec<RequestBrief>,
}

pub(crate) fn briefs(requests: &[DiskRequest]) -> Vec<RequestBrief> {
    requests.iter().map(RequestBrief::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_case_insensitive() {
        assert_eq!("fifo".parse::<PolicyKind>().unwrap(), PolicyKind::Fifo);
        assert_eq!("LOOK".parse::<PolicyKind>().unwrap(), PolicyKind::Look);
        assert_eq!("FLook".parse::<PolicyKind>().unwrap(), PolicyKind::Flook);
    }

    #[test]
    fn test_policy_parse_rejects_unknown() {
        assert_eq!(
            "clook".parse::<PolicyKind>(),
            Err(ConfigError::UnknownPolicy("clook".to_string()))
        );
    }

    #[test]
    fn test_factory_names() {
        let config = SimConfig::default();
        for kind in PolicyKind::ALL {
            let scheduler = create_scheduler(kind, &config);
            assert_eq!(scheduler.name(), kind.to_string());
            assert!(!scheduler.has_pending());
        }
    }
}
