use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::{
    domain::{
        CheckInEngine, MatchCandidates, MembershipPolicy, MembershipService, ParticipantState,
        TeamState, TimeoutScanner,
    },
    infrastructure::{InMemorySubmissionRegistry, InMemoryWalkStore, LogNotifier},
    ports::{
        Clock, Notifier, RouteAuthority, ScopedRouteAuthority, SubmissionRegistry, SystemClock,
        WalkStore,
    },
    topology::RouteTopology,
};

/// Adapters the services are built from.
#[derive(Clone)]
pub struct WalkPorts {
    pub store: Arc<dyn WalkStore>,
    pub submissions: Arc<dyn SubmissionRegistry>,
    pub notifier: Arc<dyn Notifier>,
    pub authority: Arc<dyn RouteAuthority>,
    pub clock: Arc<dyn Clock>,
}

impl WalkPorts {
    /// Everything in process: memory store, empty submission set, log
    /// notifications, scope-based authority and the system clock.
    pub fn in_memory(store: InMemoryWalkStore, submissions: InMemorySubmissionRegistry) -> Self {
        Self {
            store: Arc::new(store),
            submissions: Arc::new(submissions),
            notifier: Arc::new(LogNotifier),
            authority: Arc::new(ScopedRouteAuthority),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for WalkPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkPorts")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .field("submissions", &type_name_of_val(self.submissions.as_ref()))
            .field("notifier", &type_name_of_val(self.notifier.as_ref()))
            .field("authority", &type_name_of_val(self.authority.as_ref()))
            .field("clock", &self.clock)
            .finish()
    }
}

/// Aggregates every application service over one set of ports.
#[derive(Clone)]
pub struct WalkServices {
    pub store: Arc<dyn WalkStore>,
    pub topology: Arc<RouteTopology>,
    pub participants: ParticipantState,
    pub teams: TeamState,
    pub check_in: CheckInEngine,
    pub membership: MembershipService,
    pub timeouts: TimeoutScanner,
    pub matching: MatchCandidates,
}

impl fmt::Debug for WalkServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkServices")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .field("routes", &self.topology.routes().count())
            .field("check_in", &self.check_in)
            .field("membership", &self.membership)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl WalkServices {
    pub fn new(ports: WalkPorts, topology: Arc<RouteTopology>, policy: MembershipPolicy) -> Self {
        let WalkPorts {
            store,
            submissions,
            notifier,
            authority,
            clock,
        } = ports;

        Self {
            participants: ParticipantState::new(Arc::clone(&store)),
            teams: TeamState::new(Arc::clone(&store)),
            check_in: CheckInEngine::new(
                Arc::clone(&store),
                Arc::clone(&topology),
                authority,
                Arc::clone(&clock),
            ),
            membership: MembershipService::new(
                Arc::clone(&store),
                Arc::clone(&topology),
                submissions,
                notifier,
            )
            .with_policy(policy),
            timeouts: TimeoutScanner::new(Arc::clone(&store), Arc::clone(&topology), clock),
            matching: MatchCandidates::new(Arc::clone(&store), Arc::clone(&topology)),
            store,
            topology,
        }
    }
}
